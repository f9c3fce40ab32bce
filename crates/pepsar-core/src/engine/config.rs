use crate::core::models::column::CategoricalColumn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Monotonic transform applied to raw activity before any statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivityScaling {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "lg")]
    Lg,
    #[serde(rename = "-lg")]
    MinusLg,
}

impl ActivityScaling {
    /// Applies the transform. Log scalings are only defined for positive
    /// inputs; the scaling task validates the domain before mapping.
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Self::None => value,
            Self::Lg => value.log10(),
            Self::MinusLg => -value.log10(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Lg => "lg",
            Self::MinusLg => "-lg",
        }
    }
}

/// Aggregation surfaced for an extra dataset column in result grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Avg,
    Min,
    Max,
    Med,
}

/// Thresholds of the mutation-cliff miner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CliffSettings {
    /// Maximum number of differing positions for a pair to qualify.
    pub max_mutations: usize,
    /// Minimum absolute activity difference for a pair to qualify.
    pub min_activity_delta: f64,
}

impl Default for CliffSettings {
    fn default() -> Self {
        Self {
            max_mutations: 1,
            min_activity_delta: 0.0,
        }
    }
}

/// Narrows mutation-cliff mining to rows of one target category.
#[derive(Debug, Clone, Copy)]
pub struct TargetFilter<'a> {
    pub column: &'a CategoricalColumn,
    pub target: &'a str,
}

/// Complete settings of one analysis session.
///
/// Column choices are fixed at session start; the knobs in
/// [`SettingsUpdate`] may change afterwards and drive the invalidation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub sequence_column: String,
    pub activity_column: String,
    #[serde(default)]
    pub cluster_column: Option<String>,
    #[serde(default)]
    pub scaling: ActivityScaling,
    #[serde(default = "default_max_mutations")]
    pub max_mutations: usize,
    #[serde(default)]
    pub min_activity_delta: f64,
    #[serde(default)]
    pub columns: BTreeMap<String, Aggregation>,
    #[serde(default)]
    pub show_dendrogram: bool,
    #[serde(default)]
    pub show_logo_summary: bool,
    #[serde(default = "default_true")]
    pub show_monomer_position: bool,
    #[serde(default = "default_true")]
    pub show_most_potent_residues: bool,
}

fn default_max_mutations() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Settings {
    pub fn cliff_settings(&self) -> CliffSettings {
        CliffSettings {
            max_mutations: self.max_mutations,
            min_activity_delta: self.min_activity_delta,
        }
    }

    /// Applies a partial update and returns the artifacts invalidated by the
    /// keys that actually changed, in a stable order without duplicates.
    pub fn apply(&mut self, update: SettingsUpdate) -> Vec<Invalidation> {
        let mut invalidations = Vec::new();
        let push = |inv: Invalidation, list: &mut Vec<Invalidation>| {
            if !list.contains(&inv) {
                list.push(inv);
            }
        };

        if let Some(scaling) = update.scaling {
            if scaling != self.scaling {
                self.scaling = scaling;
                push(Invalidation::ScaledActivity, &mut invalidations);
                push(Invalidation::MonomerPositionStats, &mut invalidations);
                push(Invalidation::ClusterStats, &mut invalidations);
                push(Invalidation::MutationCliffs, &mut invalidations);
            }
        }
        if let Some(max_mutations) = update.max_mutations {
            if max_mutations != self.max_mutations {
                self.max_mutations = max_mutations;
                push(Invalidation::MutationCliffs, &mut invalidations);
            }
        }
        if let Some(min_activity_delta) = update.min_activity_delta {
            if min_activity_delta != self.min_activity_delta {
                self.min_activity_delta = min_activity_delta;
                push(Invalidation::MutationCliffs, &mut invalidations);
            }
        }
        if let Some(columns) = update.columns {
            if columns != self.columns {
                self.columns = columns;
                push(Invalidation::GridColumns, &mut invalidations);
            }
        }
        for (flag, target) in [
            (update.show_dendrogram, &mut self.show_dendrogram),
            (update.show_logo_summary, &mut self.show_logo_summary),
            (update.show_monomer_position, &mut self.show_monomer_position),
            (
                update.show_most_potent_residues,
                &mut self.show_most_potent_residues,
            ),
        ] {
            if let Some(value) = flag {
                if value != *target {
                    *target = value;
                    push(Invalidation::Viewers, &mut invalidations);
                }
            }
        }

        invalidations
    }
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub scaling: Option<ActivityScaling>,
    pub max_mutations: Option<usize>,
    pub min_activity_delta: Option<f64>,
    pub columns: Option<BTreeMap<String, Aggregation>>,
    pub show_dendrogram: Option<bool>,
    pub show_logo_summary: Option<bool>,
    pub show_monomer_position: Option<bool>,
    pub show_most_potent_residues: Option<bool>,
}

/// Artifacts a settings change can invalidate.
///
/// The first four are cached derived data; the last two are presentation-only
/// and never trigger recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    ScaledActivity,
    MonomerPositionStats,
    ClusterStats,
    MutationCliffs,
    GridColumns,
    Viewers,
}

#[derive(Default)]
pub struct SettingsBuilder {
    sequence_column: Option<String>,
    activity_column: Option<String>,
    cluster_column: Option<String>,
    scaling: Option<ActivityScaling>,
    max_mutations: Option<usize>,
    min_activity_delta: Option<f64>,
    columns: Option<BTreeMap<String, Aggregation>>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence_column(mut self, name: &str) -> Self {
        self.sequence_column = Some(name.to_string());
        self
    }
    pub fn activity_column(mut self, name: &str) -> Self {
        self.activity_column = Some(name.to_string());
        self
    }
    pub fn cluster_column(mut self, name: &str) -> Self {
        self.cluster_column = Some(name.to_string());
        self
    }
    pub fn scaling(mut self, scaling: ActivityScaling) -> Self {
        self.scaling = Some(scaling);
        self
    }
    pub fn max_mutations(mut self, value: usize) -> Self {
        self.max_mutations = Some(value);
        self
    }
    pub fn min_activity_delta(mut self, value: f64) -> Self {
        self.min_activity_delta = Some(value);
        self
    }
    pub fn columns(mut self, columns: BTreeMap<String, Aggregation>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn build(self) -> Result<Settings, ConfigError> {
        Ok(Settings {
            sequence_column: self
                .sequence_column
                .ok_or(ConfigError::MissingParameter("sequence_column"))?,
            activity_column: self
                .activity_column
                .ok_or(ConfigError::MissingParameter("activity_column"))?,
            cluster_column: self.cluster_column,
            scaling: self.scaling.unwrap_or_default(),
            max_mutations: self.max_mutations.unwrap_or(1),
            min_activity_delta: self.min_activity_delta.unwrap_or(0.0),
            columns: self.columns.unwrap_or_default(),
            show_dendrogram: false,
            show_logo_summary: false,
            show_monomer_position: true,
            show_most_potent_residues: true,
        })
    }
}
