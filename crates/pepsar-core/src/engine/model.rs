use super::cache::DerivedTables;
use super::config::{Invalidation, Settings, SettingsUpdate};
use super::error::EngineError;
use super::progress::ProgressReporter;
use super::state::{ClusterSelection, PositionSelection};
use super::sync;
use super::tasks;
use crate::core::models::column::{BooleanColumn, CategoricalColumn};
use crate::core::models::dataset::{Column, Dataset};
use crate::core::models::mask::BitMask;
use crate::core::stats::tables::{ClusterTypeStats, MonomerPositionStats, MutationCliffs};
use tracing::{debug, warn};

pub const SETTINGS_TAG: &str = "sar.settings";
pub const SELECTION_TAG: &str = "sar.monomerSelection";
pub const FILTER_TAG: &str = "sar.monomerFilter";
pub const CLUSTER_SELECTION_TAG: &str = "sar.clusterSelection";

/// The orchestrator of one analysis session.
///
/// Owns the dataset, the settings, the split position columns, and every
/// derived table, all lazily computed and invalidated through the settings
/// dependency table. Selection and filter state are synchronized to the
/// dataset's row masks on every change and persisted as JSON tags so they
/// survive reload.
pub struct SarModel {
    dataset: Dataset,
    settings: Settings,
    position_columns: Vec<CategoricalColumn>,
    raw_activity: Vec<f64>,
    custom_clusters: Vec<BooleanColumn>,
    tables: DerivedTables,
    monomer_selection: PositionSelection,
    monomer_filter: PositionSelection,
    cluster_selection: ClusterSelection,
    base_filter: BitMask,
    reporter: ProgressReporter,
}

impl SarModel {
    /// Assembled by [`crate::workflows::analyze::start`] after validation; the
    /// base filter snapshots whatever external filter was active so later
    /// filter syncs compose with it.
    pub(crate) fn new(
        dataset: Dataset,
        settings: Settings,
        position_columns: Vec<CategoricalColumn>,
        raw_activity: Vec<f64>,
        reporter: ProgressReporter,
    ) -> Self {
        let base_filter = dataset.filter().clone();
        Self {
            dataset,
            settings,
            position_columns,
            raw_activity,
            custom_clusters: Vec::new(),
            tables: DerivedTables::new(),
            monomer_selection: PositionSelection::new(),
            monomer_filter: PositionSelection::new(),
            cluster_selection: ClusterSelection::new(),
            base_filter,
            reporter,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn dataset_mut(&mut self) -> &mut Dataset {
        &mut self.dataset
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn position_columns(&self) -> &[CategoricalColumn] {
        &self.position_columns
    }

    pub fn custom_clusters(&self) -> &[BooleanColumn] {
        &self.custom_clusters
    }

    pub fn monomer_selection(&self) -> &PositionSelection {
        &self.monomer_selection
    }

    pub fn monomer_filter(&self) -> &PositionSelection {
        &self.monomer_filter
    }

    pub fn cluster_selection(&self) -> &ClusterSelection {
        &self.cluster_selection
    }

    // --- derived tables, compute-or-return-cached ---

    pub fn scaled_activity(&mut self) -> Result<&[f64], EngineError> {
        self.ensure_scaled_activity()?;
        Ok(self.tables.scaled_activity.as_deref().unwrap())
    }

    pub fn monomer_position_stats(&mut self) -> Result<&MonomerPositionStats, EngineError> {
        if self.tables.monomer_position.is_none() {
            self.ensure_scaled_activity()?;
            let activity = self.tables.scaled_activity.as_deref().unwrap();
            let table = tasks::monomer_position::run(activity, &self.position_columns, &self.reporter);
            self.tables.monomer_position = Some(table);
        }
        Ok(self.tables.monomer_position.as_ref().unwrap())
    }

    pub fn cluster_stats(&mut self) -> Result<&ClusterTypeStats, EngineError> {
        if self.tables.clusters.is_none() {
            self.ensure_scaled_activity()?;
            let activity = self.tables.scaled_activity.as_deref().unwrap();
            let original = original_cluster_column(&self.dataset, &self.settings);
            let table = tasks::cluster_stats::run(activity, original, &self.custom_clusters);
            self.tables.clusters = Some(table);
        }
        Ok(self.tables.clusters.as_ref().unwrap())
    }

    pub fn mutation_cliffs(&mut self) -> Result<&MutationCliffs, EngineError> {
        if self.tables.mutation_cliffs.is_none() {
            self.ensure_scaled_activity()?;
            let activity = self.tables.scaled_activity.as_deref().unwrap();
            let cliffs = tasks::mutation_cliffs::run(
                activity,
                &self.position_columns,
                &self.settings.cliff_settings(),
                None,
                &self.reporter,
            );
            self.tables.mutation_cliffs = Some(cliffs);
        }
        Ok(self.tables.mutation_cliffs.as_ref().unwrap())
    }

    fn ensure_scaled_activity(&mut self) -> Result<(), EngineError> {
        if self.tables.scaled_activity.is_none() {
            let scaled = tasks::scaling::run(&self.raw_activity, self.settings.scaling)?;
            self.tables.scaled_activity = Some(scaled);
        }
        Ok(())
    }

    // --- settings ---

    /// Applies a partial settings update, invalidates exactly the derived
    /// artifacts the changed keys map to, persists the new settings, and
    /// returns the invalidation set so a rendering layer can react to the
    /// presentation-only entries.
    pub fn update_settings(
        &mut self,
        update: SettingsUpdate,
    ) -> Result<Vec<Invalidation>, EngineError> {
        let invalidations = self.settings.apply(update);
        for &invalidation in &invalidations {
            self.tables.invalidate(invalidation);
        }
        if !invalidations.is_empty() {
            debug!(?invalidations, "Settings updated.");
            self.persist_settings()?;
        }
        Ok(invalidations)
    }

    // --- selection / filter ---

    /// Toggles one (position, monomer) selection entry and resynchronizes the
    /// dataset's selection mask.
    pub fn toggle_monomer_selection(
        &mut self,
        position: &str,
        monomer: &str,
    ) -> Result<(), EngineError> {
        self.monomer_selection.toggle(position, monomer);
        self.sync_selection();
        self.persist_selection_state()
    }

    /// Toggles a cluster selection entry; the name must resolve in either the
    /// original or the custom partition.
    pub fn toggle_cluster_selection(&mut self, name: &str) -> Result<(), EngineError> {
        let original = original_cluster_column(&self.dataset, &self.settings);
        if sync::cluster_mask(name, original, &self.custom_clusters).is_none() {
            return Err(EngineError::UnknownCluster(name.to_string()));
        }
        self.cluster_selection.toggle(name);
        self.sync_selection();
        self.persist_selection_state()
    }

    /// Toggles one (position, monomer) filter entry and resynchronizes the
    /// dataset's filter mask.
    pub fn toggle_monomer_filter(
        &mut self,
        position: &str,
        monomer: &str,
    ) -> Result<(), EngineError> {
        self.monomer_filter.toggle(position, monomer);
        self.sync_filter();
        self.persist_selection_state()
    }

    pub fn reset_selection(&mut self) -> Result<(), EngineError> {
        self.monomer_selection.clear();
        self.cluster_selection.clear();
        self.sync_selection();
        self.persist_selection_state()
    }

    pub fn reset_filter(&mut self) -> Result<(), EngineError> {
        self.monomer_filter.clear();
        self.sync_filter();
        self.persist_selection_state()
    }

    fn sync_selection(&mut self) {
        let mask = sync::selection_mask(
            self.dataset.row_count(),
            &self.position_columns,
            &self.monomer_selection,
            &self.cluster_selection,
            original_cluster_column(&self.dataset, &self.settings),
            &self.custom_clusters,
        );
        self.dataset.set_selection(mask);
    }

    fn sync_filter(&mut self) {
        let mask = sync::filter_mask(&self.base_filter, &self.position_columns, &self.monomer_filter);
        self.dataset.set_filter(mask);
    }

    // --- custom clusters ---

    /// Registers a user-drawn cluster. The name must be unique across both
    /// partitions, which keeps later membership lookup unambiguous.
    pub fn add_custom_cluster(&mut self, column: BooleanColumn) -> Result<(), EngineError> {
        if column.len() != self.dataset.row_count() {
            return Err(EngineError::Configuration(format!(
                "custom cluster '{}' has {} rows, dataset has {}",
                column.name(),
                column.len(),
                self.dataset.row_count()
            )));
        }
        let original = original_cluster_column(&self.dataset, &self.settings);
        let collides_with_original =
            original.is_some_and(|c| c.category_index(column.name()).is_some());
        let collides_with_custom = self.custom_clusters.iter().any(|c| c.name() == column.name());
        if collides_with_original || collides_with_custom {
            return Err(EngineError::DuplicateCluster(column.name().to_string()));
        }

        self.custom_clusters.push(column);
        self.tables.invalidate(Invalidation::ClusterStats);
        Ok(())
    }

    /// Snapshots the current row selection as a new custom cluster.
    pub fn cluster_from_selection(&mut self, name: &str) -> Result<(), EngineError> {
        let column = BooleanColumn::new(name, self.dataset.selection().clone());
        self.add_custom_cluster(column)
    }

    // --- persisted state ---

    pub(crate) fn persist_settings(&mut self) -> Result<(), EngineError> {
        let json = serde_json::to_string(&self.settings)?;
        self.dataset.set_tag(SETTINGS_TAG, &json);
        Ok(())
    }

    fn persist_selection_state(&mut self) -> Result<(), EngineError> {
        let selection = self.monomer_selection.to_json()?;
        let filter = self.monomer_filter.to_json()?;
        let clusters = self.cluster_selection.to_json()?;
        self.dataset.set_tag(SELECTION_TAG, &selection);
        self.dataset.set_tag(FILTER_TAG, &filter);
        self.dataset.set_tag(CLUSTER_SELECTION_TAG, &clusters);
        Ok(())
    }

    /// Restores selection/filter state from the dataset's tags. Corrupt tag
    /// content is dropped with a warning rather than failing the session.
    pub(crate) fn restore_persisted_state(&mut self) {
        if let Some(json) = self.dataset.tag(SELECTION_TAG) {
            match PositionSelection::from_json(json) {
                Ok(state) => self.monomer_selection = state,
                Err(error) => warn!(%error, "Discarding unreadable selection tag."),
            }
        }
        if let Some(json) = self.dataset.tag(FILTER_TAG) {
            match PositionSelection::from_json(json) {
                Ok(state) => self.monomer_filter = state,
                Err(error) => warn!(%error, "Discarding unreadable filter tag."),
            }
        }
        if let Some(json) = self.dataset.tag(CLUSTER_SELECTION_TAG) {
            match ClusterSelection::from_json(json) {
                Ok(state) => self.cluster_selection = state,
                Err(error) => warn!(%error, "Discarding unreadable cluster-selection tag."),
            }
        }

        if !self.monomer_selection.is_empty() || !self.cluster_selection.is_empty() {
            self.sync_selection();
        }
        if !self.monomer_filter.is_empty() {
            self.sync_filter();
        }
    }
}

// Free function rather than a method so derived-table accessors can borrow
// the dataset while `self.tables` is held mutably.
fn original_cluster_column<'a>(
    dataset: &'a Dataset,
    settings: &Settings,
) -> Option<&'a CategoricalColumn> {
    settings
        .cluster_column
        .as_deref()
        .and_then(|name| dataset.column(name))
        .and_then(Column::as_categorical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::column::NumericColumn;
    use crate::engine::config::{ActivityScaling, SettingsBuilder};

    fn create_test_model() -> SarModel {
        let mut dataset = Dataset::new("peptides", 4);
        dataset
            .add_column(Column::Categorical(CategoricalColumn::from_values(
                "sequence",
                ["A-C", "A-D", "B-C", "B-D"],
            )))
            .unwrap();
        dataset
            .add_column(Column::Numeric(NumericColumn::new(
                "activity",
                vec![1.0, 2.0, 5.0, 6.0],
            )))
            .unwrap();
        dataset
            .add_column(Column::Categorical(CategoricalColumn::from_values(
                "cluster",
                ["c1", "c1", "c2", "c2"],
            )))
            .unwrap();

        let settings = SettingsBuilder::new()
            .sequence_column("sequence")
            .activity_column("activity")
            .cluster_column("cluster")
            .build()
            .unwrap();
        let position_columns = vec![
            CategoricalColumn::from_values("1", ["A", "A", "B", "B"]),
            CategoricalColumn::from_values("2", ["C", "D", "C", "D"]),
        ];

        SarModel::new(
            dataset,
            settings,
            position_columns,
            vec![1.0, 2.0, 5.0, 6.0],
            ProgressReporter::new(),
        )
    }

    #[test]
    fn derived_tables_are_cached_until_invalidated() {
        let mut model = create_test_model();

        assert!(model.tables.monomer_position.is_none());
        model.monomer_position_stats().unwrap();
        assert!(model.tables.monomer_position.is_some());

        // threshold change leaves stats alone but drops cliffs
        model.mutation_cliffs().unwrap();
        model
            .update_settings(SettingsUpdate {
                max_mutations: Some(2),
                ..SettingsUpdate::default()
            })
            .unwrap();
        assert!(model.tables.monomer_position.is_some());
        assert!(model.tables.mutation_cliffs.is_none());
    }

    #[test]
    fn scaling_change_invalidates_everything_derived() {
        let mut model = create_test_model();
        model.monomer_position_stats().unwrap();
        model.cluster_stats().unwrap();
        model.mutation_cliffs().unwrap();

        model
            .update_settings(SettingsUpdate {
                scaling: Some(ActivityScaling::Lg),
                ..SettingsUpdate::default()
            })
            .unwrap();

        assert!(model.tables.scaled_activity.is_none());
        assert!(model.tables.monomer_position.is_none());
        assert!(model.tables.clusters.is_none());
        assert!(model.tables.mutation_cliffs.is_none());

        let scaled = model.scaled_activity().unwrap();
        assert!((scaled[2] - 5.0f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn settings_update_persists_to_the_settings_tag() {
        let mut model = create_test_model();
        model
            .update_settings(SettingsUpdate {
                min_activity_delta: Some(0.5),
                ..SettingsUpdate::default()
            })
            .unwrap();

        let json = model.dataset().tag(SETTINGS_TAG).unwrap();
        let restored: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(restored.min_activity_delta, 0.5);
    }

    #[test]
    fn toggling_selection_twice_restores_the_mask() {
        let mut model = create_test_model();
        let before = model.dataset().selection().clone();

        model.toggle_monomer_selection("1", "A").unwrap();
        assert_eq!(model.dataset().selection().ones(), vec![0, 1]);

        model.toggle_monomer_selection("1", "A").unwrap();
        assert_eq!(model.dataset().selection(), &before);
    }

    #[test]
    fn selection_composes_monomers_and_clusters_with_or() {
        let mut model = create_test_model();
        model.toggle_monomer_selection("2", "D").unwrap();
        model.toggle_cluster_selection("c2").unwrap();

        // rows 1,3 match position 2 = D; rows 2,3 belong to c2
        assert_eq!(model.dataset().selection().ones(), vec![1, 2, 3]);
    }

    #[test]
    fn filter_composes_positions_with_and() {
        let mut model = create_test_model();
        model.toggle_monomer_filter("1", "B").unwrap();
        model.toggle_monomer_filter("2", "C").unwrap();

        assert_eq!(model.dataset().filter().ones(), vec![2]);

        model.reset_filter().unwrap();
        assert_eq!(model.dataset().filter().true_count(), 4);
    }

    #[test]
    fn unknown_cluster_toggle_is_rejected() {
        let mut model = create_test_model();
        let result = model.toggle_cluster_selection("nope");
        assert!(matches!(result, Err(EngineError::UnknownCluster(_))));
        assert!(model.cluster_selection().is_empty());
    }

    #[test]
    fn custom_cluster_names_must_be_unique_across_partitions() {
        let mut model = create_test_model();

        let collision = BooleanColumn::new("c1", BitMask::new(4));
        assert!(matches!(
            model.add_custom_cluster(collision),
            Err(EngineError::DuplicateCluster(_))
        ));

        let drawn = BooleanColumn::new("drawn", BitMask::from_fn(4, |row| row < 2));
        model.add_custom_cluster(drawn).unwrap();

        let again = BooleanColumn::new("drawn", BitMask::new(4));
        assert!(matches!(
            model.add_custom_cluster(again),
            Err(EngineError::DuplicateCluster(_))
        ));
    }

    #[test]
    fn custom_cluster_feeds_stats_and_selection() {
        let mut model = create_test_model();
        model.toggle_monomer_selection("1", "B").unwrap();
        model.cluster_from_selection("high").unwrap();
        model.reset_selection().unwrap();

        let stats = model.cluster_stats().unwrap();
        assert_eq!(stats.get("high").unwrap().count, 2);

        model.toggle_cluster_selection("high").unwrap();
        assert_eq!(model.dataset().selection().ones(), vec![2, 3]);
    }

    #[test]
    fn selection_state_round_trips_through_tags() {
        let mut model = create_test_model();
        model.toggle_monomer_selection("1", "A").unwrap();
        model.toggle_monomer_filter("2", "C").unwrap();
        model.toggle_cluster_selection("c1").unwrap();

        // carry the tags over to a fresh session on the same data
        let selection_tag = model.dataset().tag(SELECTION_TAG).unwrap().to_string();
        let filter_tag = model.dataset().tag(FILTER_TAG).unwrap().to_string();
        let cluster_tag = model.dataset().tag(CLUSTER_SELECTION_TAG).unwrap().to_string();

        let mut fresh = create_test_model();
        fresh.dataset_mut().set_tag(SELECTION_TAG, &selection_tag);
        fresh.dataset_mut().set_tag(FILTER_TAG, &filter_tag);
        fresh
            .dataset_mut()
            .set_tag(CLUSTER_SELECTION_TAG, &cluster_tag);
        fresh.restore_persisted_state();

        assert_eq!(fresh.monomer_selection(), model.monomer_selection());
        assert_eq!(fresh.monomer_filter(), model.monomer_filter());
        assert_eq!(fresh.cluster_selection(), model.cluster_selection());
        assert_eq!(fresh.dataset().selection(), model.dataset().selection());
        assert_eq!(fresh.dataset().filter(), model.dataset().filter());
    }

    #[test]
    fn corrupt_persisted_state_is_discarded_not_fatal() {
        let mut model = create_test_model();
        model.dataset_mut().set_tag(SELECTION_TAG, "not json");
        model.restore_persisted_state();
        assert!(model.monomer_selection().is_empty());
    }

    #[test]
    fn random_toggle_sequences_return_to_the_initial_mask() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut model = create_test_model();
        let before = model.dataset().selection().clone();
        let positions = ["1", "2"];
        let monomers = ["A", "B", "C", "D"];

        let mut rng = StdRng::seed_from_u64(7);
        let mut toggled = Vec::new();
        for _ in 0..24 {
            let p = rng.gen_range(0..positions.len());
            let m = rng.gen_range(0..monomers.len());
            model.toggle_monomer_selection(positions[p], monomers[m]).unwrap();
            toggled.push((p, m));
        }
        // replay every toggle a second time; membership depends only on parity
        for (p, m) in toggled.into_iter().rev() {
            model.toggle_monomer_selection(positions[p], monomers[m]).unwrap();
        }

        assert!(model.monomer_selection().is_empty());
        assert_eq!(model.dataset().selection(), &before);
    }

    #[test]
    fn base_filter_composes_with_monomer_filter() {
        let mut dataset = Dataset::new("peptides", 4);
        dataset
            .add_column(Column::Numeric(NumericColumn::new(
                "activity",
                vec![1.0, 2.0, 3.0, 4.0],
            )))
            .unwrap();
        // an external filter is already hiding row 0
        dataset.set_filter(BitMask::from_fn(4, |row| row != 0));

        let settings = SettingsBuilder::new()
            .sequence_column("sequence")
            .activity_column("activity")
            .build()
            .unwrap();
        let position_columns = vec![CategoricalColumn::from_values("1", ["A", "A", "B", "B"])];
        let mut model = SarModel::new(
            dataset,
            settings,
            position_columns,
            vec![1.0, 2.0, 3.0, 4.0],
            ProgressReporter::new(),
        );

        model.toggle_monomer_filter("1", "A").unwrap();
        assert_eq!(model.dataset().filter().ones(), vec![1]);
    }
}
