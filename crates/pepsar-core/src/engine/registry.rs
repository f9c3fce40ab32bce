use super::model::SarModel;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable identity of one registered analysis session.
    pub struct DatasetKey;
}

/// Explicit dataset-identity → model registry.
///
/// Models are registered when an analysis starts and removed when the dataset
/// is closed; nothing is ever stashed on the dataset object itself.
#[derive(Default)]
pub struct ModelRegistry {
    models: SlotMap<DatasetKey, SarModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly started model and returns its key.
    pub fn register(&mut self, model: SarModel) -> DatasetKey {
        self.models.insert(model)
    }

    pub fn get(&self, key: DatasetKey) -> Option<&SarModel> {
        self.models.get(key)
    }

    pub fn get_mut(&mut self, key: DatasetKey) -> Option<&mut SarModel> {
        self.models.get_mut(key)
    }

    pub fn contains(&self, key: DatasetKey) -> bool {
        self.models.contains_key(key)
    }

    /// Ends the session for a closed dataset, returning the model for any
    /// final teardown the caller wants to do.
    pub fn close(&mut self, key: DatasetKey) -> Option<SarModel> {
        self.models.remove(key)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::column::{CategoricalColumn, NumericColumn};
    use crate::core::models::dataset::{Column, Dataset};
    use crate::engine::config::SettingsBuilder;
    use crate::engine::progress::ProgressReporter;

    fn create_test_model(name: &str) -> SarModel {
        let mut dataset = Dataset::new(name, 2);
        dataset
            .add_column(Column::Numeric(NumericColumn::new("activity", vec![1.0, 2.0])))
            .unwrap();
        let settings = SettingsBuilder::new()
            .sequence_column("sequence")
            .activity_column("activity")
            .build()
            .unwrap();
        SarModel::new(
            dataset,
            settings,
            vec![CategoricalColumn::from_values("1", ["A", "B"])],
            vec![1.0, 2.0],
            ProgressReporter::new(),
        )
    }

    #[test]
    fn register_and_lookup_round_trip() {
        let mut registry = ModelRegistry::new();
        assert!(registry.is_empty());

        let key = registry.register(create_test_model("d1"));
        assert!(registry.contains(key));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(key).unwrap().dataset().name(), "d1");
    }

    #[test]
    fn close_removes_the_model_and_invalidates_the_key() {
        let mut registry = ModelRegistry::new();
        let key = registry.register(create_test_model("d1"));

        let model = registry.close(key).unwrap();
        assert_eq!(model.dataset().name(), "d1");
        assert!(!registry.contains(key));
        assert!(registry.get(key).is_none());
        assert!(registry.close(key).is_none());
    }

    #[test]
    fn keys_stay_distinct_across_sessions() {
        let mut registry = ModelRegistry::new();
        let first = registry.register(create_test_model("d1"));
        let second = registry.register(create_test_model("d2"));
        assert_ne!(first, second);

        registry.close(first);
        let third = registry.register(create_test_model("d3"));
        assert_ne!(first, third);
        assert_eq!(registry.len(), 2);
    }
}
