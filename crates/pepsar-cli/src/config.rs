use crate::error::{CliError, Result};
use pepsar::core::io::splitter::{SEPARATOR_TAG, UNITS_TAG};
use pepsar::core::models::dataset::Dataset;
use pepsar::engine::config::{ActivityScaling, Aggregation, Settings, SettingsBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The TOML analysis configuration:
///
/// ```toml
/// [columns]
/// sequence = "sequence"
/// activity = "activity"
/// cluster = "cluster"        # optional
///
/// [sequence]
/// notation = "separated"     # or "fasta"
/// separator = "-"            # required for separated notation
///
/// [analysis]                 # optional, all keys optional
/// scaling = "-lg"            # "none" | "lg" | "-lg"
/// max-mutations = 1
/// min-activity-delta = 0.0
///
/// [aggregations]             # optional: column -> "avg" | "min" | "max" | "med"
/// ic50 = "avg"
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    pub columns: ColumnsConfig,
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub aggregations: BTreeMap<String, Aggregation>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnsConfig {
    pub sequence: String,
    pub activity: String,
    #[serde(default)]
    pub cluster: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceConfig {
    pub notation: String,
    #[serde(default)]
    pub separator: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    #[serde(default)]
    pub scaling: Option<ActivityScaling>,
    #[serde(default)]
    pub max_mutations: Option<usize>,
    #[serde(default)]
    pub min_activity_delta: Option<f64>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| CliError::ConfigParsing {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the engine settings from the config file.
    pub fn to_settings(&self) -> Result<Settings> {
        let mut builder = SettingsBuilder::new()
            .sequence_column(&self.columns.sequence)
            .activity_column(&self.columns.activity)
            .columns(self.aggregations.clone());
        if let Some(cluster) = &self.columns.cluster {
            builder = builder.cluster_column(cluster);
        }
        if let Some(scaling) = self.analysis.scaling {
            builder = builder.scaling(scaling);
        }
        if let Some(max_mutations) = self.analysis.max_mutations {
            builder = builder.max_mutations(max_mutations);
        }
        if let Some(min_activity_delta) = self.analysis.min_activity_delta {
            builder = builder.min_activity_delta(min_activity_delta);
        }
        builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Tags the sequence column with its notation so the splitter can read it;
    /// plain CSV files carry no column metadata of their own.
    pub fn apply_sequence_tags(&self, dataset: &mut Dataset) {
        dataset.set_column_tag(&self.columns.sequence, UNITS_TAG, &self.sequence.notation);
        if let Some(separator) = &self.sequence.separator {
            dataset.set_column_tag(&self.columns.sequence, SEPARATOR_TAG, separator);
        }
    }
}

/// Maps a `--scaling` CLI override to the engine enum.
pub fn parse_scaling(value: &str) -> Result<ActivityScaling> {
    match value {
        "none" => Ok(ActivityScaling::None),
        "lg" => Ok(ActivityScaling::Lg),
        "-lg" => Ok(ActivityScaling::MinusLg),
        other => Err(CliError::Argument(format!(
            "unknown scaling '{other}', expected 'none', 'lg' or '-lg'"
        ))),
    }
}
