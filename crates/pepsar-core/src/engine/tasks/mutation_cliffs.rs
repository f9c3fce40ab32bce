use crate::core::models::column::CategoricalColumn;
use crate::core::stats::tables::MutationCliffs;
use crate::engine::config::{CliffSettings, TargetFilter};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

#[cfg(not(feature = "parallel"))]
use itertools::Itertools;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// The pairwise scan is quadratic; past this row count it is still correct but
// no longer interactive.
const QUADRATIC_SCAN_WARNING_ROWS: usize = 200_000;

/// Mines mutation cliffs: pairs of rows differing at no more than
/// `max_mutations` positions with an activity gap of at least
/// `min_activity_delta`.
///
/// Every qualifying pair (i, j) is recorded in both directions, each row under
/// its own monomer at every differing position keyed by itself as reference.
/// With a target filter, only rows of the target category participate. An
/// empty result is an empty structure, not an error.
#[instrument(skip_all, name = "mutation_cliffs_task")]
pub fn run(
    activity: &[f64],
    position_columns: &[CategoricalColumn],
    settings: &CliffSettings,
    target: Option<&TargetFilter>,
    reporter: &ProgressReporter,
) -> MutationCliffs {
    let rows = participating_rows(activity.len(), target);
    if rows.len() > QUADRATIC_SCAN_WARNING_ROWS {
        warn!(
            rows = rows.len(),
            "Mutation-cliff scan is quadratic; expect a long computation."
        );
    }
    reporter.report(Progress::Message(format!(
        "Mining mutation cliffs over {} rows",
        rows.len()
    )));

    #[cfg(not(feature = "parallel"))]
    let qualifying: Vec<(usize, usize, Vec<usize>)> = rows
        .iter()
        .copied()
        .tuple_combinations()
        .filter_map(|(i, j)| scan_pair(i, j, activity, position_columns, settings))
        .collect();

    #[cfg(feature = "parallel")]
    let qualifying: Vec<(usize, usize, Vec<usize>)> = rows
        .par_iter()
        .enumerate()
        .flat_map_iter(|(k, &i)| {
            rows[k + 1..]
                .iter()
                .filter_map(move |&j| scan_pair(i, j, activity, position_columns, settings))
        })
        .collect();

    // Single sequential commit keeps the result identical across feature sets.
    let mut cliffs = MutationCliffs::default();
    for (i, j, differing) in qualifying {
        for position in differing {
            let column = &position_columns[position];
            cliffs.record(column.value(i), column.name(), i, j);
            cliffs.record(column.value(j), column.name(), j, i);
        }
    }

    info!(pairs = cliffs.pair_count(), "Mutation-cliff mining complete.");
    cliffs
}

fn participating_rows(row_count: usize, target: Option<&TargetFilter>) -> Vec<usize> {
    match target {
        None => (0..row_count).collect(),
        Some(filter) => match filter.column.category_index(filter.target) {
            None => Vec::new(),
            Some(id) => filter
                .column
                .raw_data()
                .iter()
                .enumerate()
                .filter(|&(_, &value)| value == id)
                .map(|(row, _)| row)
                .collect(),
        },
    }
}

// Cheap activity check first, then Hamming distance with early exit once the
// mismatch count exceeds the budget.
fn scan_pair(
    i: usize,
    j: usize,
    activity: &[f64],
    position_columns: &[CategoricalColumn],
    settings: &CliffSettings,
) -> Option<(usize, usize, Vec<usize>)> {
    if (activity[i] - activity[j]).abs() < settings.min_activity_delta {
        return None;
    }

    let mut differing = Vec::new();
    for (position, column) in position_columns.iter().enumerate() {
        let raw = column.raw_data();
        if raw[i] != raw[j] {
            if differing.len() == settings.max_mutations {
                return None;
            }
            differing.push(position);
        }
    }

    if differing.is_empty() {
        None
    } else {
        Some((i, j, differing))
    }
}
