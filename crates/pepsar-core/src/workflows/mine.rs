use crate::core::models::column::CategoricalColumn;
use crate::core::stats::tables::MutationCliffs;
use crate::engine::config::{CliffSettings, TargetFilter};
use crate::engine::progress::ProgressReporter;
use crate::engine::tasks;

/// Runs the mutation-cliff miner on its own, without a model session.
///
/// Useful for batch mining against precomputed position columns, optionally
/// narrowed to one target category.
pub fn run(
    activity: &[f64],
    position_columns: &[CategoricalColumn],
    settings: &CliffSettings,
    target: Option<&TargetFilter>,
    reporter: &ProgressReporter,
) -> MutationCliffs {
    tasks::mutation_cliffs::run(activity, position_columns, settings, target, reporter)
}
