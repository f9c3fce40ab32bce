use super::config::Invalidation;
use crate::core::stats::tables::{ClusterTypeStats, MonomerPositionStats, MutationCliffs};

/// Memoization slots for the derived artifacts of a session.
///
/// Slots are filled by the model's compute-or-return-cached accessors and
/// emptied only through [`invalidate`](Self::invalidate), driven by the
/// settings dependency table; there is no other way a slot changes, which
/// keeps invalidation auditable.
#[derive(Default)]
pub struct DerivedTables {
    pub(crate) scaled_activity: Option<Vec<f64>>,
    pub(crate) monomer_position: Option<MonomerPositionStats>,
    pub(crate) clusters: Option<ClusterTypeStats>,
    pub(crate) mutation_cliffs: Option<MutationCliffs>,
}

impl DerivedTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the slot named by `invalidation`; presentation-only variants are
    /// no-ops here.
    pub fn invalidate(&mut self, invalidation: Invalidation) {
        match invalidation {
            Invalidation::ScaledActivity => self.scaled_activity = None,
            Invalidation::MonomerPositionStats => self.monomer_position = None,
            Invalidation::ClusterStats => self.clusters = None,
            Invalidation::MutationCliffs => self.mutation_cliffs = None,
            Invalidation::GridColumns | Invalidation::Viewers => {}
        }
    }

    pub fn invalidate_all(&mut self) {
        self.scaled_activity = None;
        self.monomer_position = None;
        self.clusters = None;
        self.mutation_cliffs = None;
    }
}
