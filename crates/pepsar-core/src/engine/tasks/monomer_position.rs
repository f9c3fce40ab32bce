use crate::core::models::column::CategoricalColumn;
use crate::core::models::mask::BitMask;
use crate::core::stats::summary::compute_stats;
use crate::core::stats::tables::{MonomerPositionStats, PositionStats};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Builds the monomer-position statistics table.
///
/// For every position, one pass over the raw id array materializes the masks
/// of all categories at once; each non-gap category is then tested against
/// its complement. Per-monomer stats fold into the position summary, and each
/// finished position summary folds into the table-wide one.
#[instrument(skip_all, name = "monomer_position_task")]
pub fn run(
    activity: &[f64],
    position_columns: &[CategoricalColumn],
    reporter: &ProgressReporter,
) -> MonomerPositionStats {
    reporter.report(Progress::TaskStart {
        total_steps: position_columns.len() as u64,
    });

    let mut table = MonomerPositionStats::default();
    for column in position_columns {
        let masks = category_masks(column);

        let mut position = PositionStats::default();
        for (id, mask) in masks.iter().enumerate() {
            let monomer = &column.categories()[id];
            if monomer.is_empty() || mask.true_count() == 0 {
                continue;
            }
            let stats = compute_stats(activity, mask);
            position.general.fold_stats(&stats);
            position.monomers.insert(monomer.clone(), stats);
        }

        table.general.fold_summary(&position.general);
        table.positions.insert(column.name().to_string(), position);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    info!(
        positions = table.positions.len(),
        entries = table.entry_count(),
        "Monomer-position statistics computed."
    );
    table
}

fn category_masks(column: &CategoricalColumn) -> Vec<BitMask> {
    let rows = column.len();
    let mut masks: Vec<BitMask> = (0..column.categories().len())
        .map(|_| BitMask::new(rows))
        .collect();
    for (row, &id) in column.raw_data().iter().enumerate() {
        masks[id as usize].set(row, true);
    }
    masks
}
