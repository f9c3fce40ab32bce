use crate::core::io::splitter::{self, SEPARATOR_TAG, SequenceNotation, UNITS_TAG};
use crate::core::models::dataset::{Column, Dataset};
use crate::engine::config::Settings;
use crate::engine::error::EngineError;
use crate::engine::model::SarModel;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Starts an analysis session.
///
/// Validates the configuration fail-fast — a non-numeric or non-finite
/// activity column, a missing sequence column, or unusable notation tagging
/// abort before anything is computed and no model is created. On success the
/// sequence column is split into position columns and the model is returned
/// with its derived tables still lazy; any previously persisted
/// selection/filter state is restored from the dataset's tags.
#[instrument(skip_all, name = "analyze_workflow")]
pub fn start(
    dataset: Dataset,
    settings: Settings,
    reporter: ProgressReporter,
) -> Result<SarModel, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Validation" });

    let activity = dataset
        .column(&settings.activity_column)
        .ok_or_else(|| EngineError::ColumnNotFound(settings.activity_column.clone()))?
        .as_numeric()
        .ok_or_else(|| EngineError::ActivityNotNumeric {
            column: settings.activity_column.clone(),
        })?;
    if let Some(row) = activity.first_non_finite() {
        return Err(EngineError::ActivityNotFinite {
            column: settings.activity_column.clone(),
            row,
        });
    }
    let raw_activity = activity.values().to_vec();

    let sequences = dataset
        .column(&settings.sequence_column)
        .ok_or_else(|| EngineError::ColumnNotFound(settings.sequence_column.clone()))?
        .as_categorical()
        .ok_or_else(|| EngineError::Configuration(format!(
            "sequence column '{}' must be categorical",
            settings.sequence_column
        )))?;
    let notation = SequenceNotation::from_tags(
        dataset.column_tag(&settings.sequence_column, UNITS_TAG),
        dataset.column_tag(&settings.sequence_column, SEPARATOR_TAG),
    )
    .map_err(|error| EngineError::SequenceNotation {
        column: settings.sequence_column.clone(),
        reason: error.to_string(),
    })?;

    if let Some(cluster_column) = settings.cluster_column.as_deref() {
        dataset
            .column(cluster_column)
            .ok_or_else(|| EngineError::ColumnNotFound(cluster_column.to_string()))?
            .as_categorical()
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "cluster column '{cluster_column}' must be categorical"
                ))
            })?;
    }

    reporter.report(Progress::PhaseFinish);
    reporter.report(Progress::PhaseStart { name: "Splitting Sequences" });

    let position_columns = splitter::split_to_positions(sequences, &notation);
    info!(
        rows = dataset.row_count(),
        positions = position_columns.len(),
        "Sequence column split into position columns."
    );

    reporter.report(Progress::PhaseFinish);

    let mut model = SarModel::new(dataset, settings, position_columns, raw_activity, reporter);
    model.restore_persisted_state();
    model.persist_settings()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::column::{CategoricalColumn, NumericColumn};
    use crate::engine::config::SettingsBuilder;
    use crate::engine::model::SELECTION_TAG;

    fn create_test_dataset() -> Dataset {
        let mut dataset = Dataset::new("peptides", 3);
        dataset
            .add_column(Column::Categorical(CategoricalColumn::from_values(
                "sequence",
                ["A-B-C", "A-C-C", "A-C-D"],
            )))
            .unwrap();
        dataset
            .add_column(Column::Numeric(NumericColumn::new(
                "activity",
                vec![1.0, 2.0, 5.0],
            )))
            .unwrap();
        dataset.set_column_tag("sequence", UNITS_TAG, "separated");
        dataset.set_column_tag("sequence", SEPARATOR_TAG, "-");
        dataset
    }

    fn create_test_settings() -> Settings {
        SettingsBuilder::new()
            .sequence_column("sequence")
            .activity_column("activity")
            .build()
            .unwrap()
    }

    #[test]
    fn start_splits_sequences_and_returns_a_model() {
        let mut model = start(
            create_test_dataset(),
            create_test_settings(),
            ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(model.position_columns().len(), 3);
        assert_eq!(model.position_columns()[1].name(), "2");

        let stats = model.monomer_position_stats().unwrap();
        assert!(stats.get("2", "B").is_some());
        assert!(stats.get("2", "C").is_some());
    }

    #[test]
    fn start_writes_the_settings_tag() {
        let model = start(
            create_test_dataset(),
            create_test_settings(),
            ProgressReporter::new(),
        )
        .unwrap();
        let json = model.dataset().tag(crate::engine::model::SETTINGS_TAG).unwrap();
        let restored: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(restored.sequence_column, "sequence");
    }

    #[test]
    fn missing_activity_column_fails_fast() {
        let settings = SettingsBuilder::new()
            .sequence_column("sequence")
            .activity_column("potency")
            .build()
            .unwrap();
        let result = start(create_test_dataset(), settings, ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::ColumnNotFound(name)) if name == "potency"));
    }

    #[test]
    fn categorical_activity_column_fails_fast() {
        let settings = SettingsBuilder::new()
            .sequence_column("sequence")
            .activity_column("sequence")
            .build()
            .unwrap();
        let result = start(create_test_dataset(), settings, ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::ActivityNotNumeric { .. })));
    }

    #[test]
    fn nan_activity_fails_fast() {
        let mut dataset = Dataset::new("peptides", 2);
        dataset
            .add_column(Column::Categorical(CategoricalColumn::from_values(
                "sequence",
                ["A-B", "A-C"],
            )))
            .unwrap();
        dataset
            .add_column(Column::Numeric(NumericColumn::new(
                "activity",
                vec![1.0, f64::NAN],
            )))
            .unwrap();
        dataset.set_column_tag("sequence", UNITS_TAG, "separated");
        dataset.set_column_tag("sequence", SEPARATOR_TAG, "-");

        let result = start(dataset, create_test_settings(), ProgressReporter::new());
        assert!(matches!(
            result,
            Err(EngineError::ActivityNotFinite { row: 1, .. })
        ));
    }

    #[test]
    fn missing_notation_tags_fail_fast() {
        let mut dataset = create_test_dataset();
        dataset.set_column_tag("sequence", UNITS_TAG, "helm");
        let result = start(dataset, create_test_settings(), ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::SequenceNotation { .. })));
    }

    #[test]
    fn configured_cluster_column_must_exist() {
        let settings = SettingsBuilder::new()
            .sequence_column("sequence")
            .activity_column("activity")
            .cluster_column("cluster")
            .build()
            .unwrap();
        let result = start(create_test_dataset(), settings, ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::ColumnNotFound(name)) if name == "cluster"));
    }

    #[test]
    fn persisted_selection_is_restored_on_start() {
        let mut dataset = create_test_dataset();
        dataset.set_tag(SELECTION_TAG, r#"{"2":["C"]}"#);

        let model = start(dataset, create_test_settings(), ProgressReporter::new()).unwrap();
        assert!(model.monomer_selection().is_selected("2", "C"));
        assert_eq!(model.dataset().selection().ones(), vec![1, 2]);
    }
}
