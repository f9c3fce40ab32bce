use super::state::{ClusterSelection, PositionSelection};
use crate::core::models::column::{BooleanColumn, CategoricalColumn};
use crate::core::models::mask::BitMask;

/// Recomputes the row-selection mask from the current selection state.
///
/// Selection composes with OR: a row is selected when it matches any chosen
/// monomer at any constrained position, or belongs to any chosen cluster.
pub fn selection_mask(
    row_count: usize,
    position_columns: &[CategoricalColumn],
    monomers: &PositionSelection,
    clusters: &ClusterSelection,
    original_clusters: Option<&CategoricalColumn>,
    custom_clusters: &[BooleanColumn],
) -> BitMask {
    let mut mask = BitMask::new(row_count);

    for (position, chosen) in monomers.constrained_positions() {
        let Some(column) = position_columns.iter().find(|c| c.name() == position) else {
            continue;
        };
        or_matching_rows(&mut mask, column, chosen);
    }

    for name in clusters.names() {
        if let Some(cluster) = cluster_mask(name, original_clusters, custom_clusters) {
            mask.or_assign(&cluster);
        }
    }

    mask
}

/// Recomputes the row-filter mask from the current filter state.
///
/// Filtering composes with AND: starting from the base filter captured at
/// session start, a row survives only if, at every constrained position, its
/// value is among the chosen monomers. An empty list imposes no constraint.
pub fn filter_mask(
    base: &BitMask,
    position_columns: &[CategoricalColumn],
    monomers: &PositionSelection,
) -> BitMask {
    let mut mask = base.clone();

    for (position, chosen) in monomers.constrained_positions() {
        let Some(column) = position_columns.iter().find(|c| c.name() == position) else {
            continue;
        };
        let mut constraint = BitMask::new(base.len());
        or_matching_rows(&mut constraint, column, chosen);
        mask.and_assign(&constraint);
    }

    mask
}

/// Resolves a cluster name to its row mask, trying original categories first
/// and falling back to custom boolean columns.
pub fn cluster_mask(
    name: &str,
    original_clusters: Option<&CategoricalColumn>,
    custom_clusters: &[BooleanColumn],
) -> Option<BitMask> {
    if let Some(column) = original_clusters {
        if let Some(mask) = column.value_mask(name) {
            return Some(mask);
        }
    }
    custom_clusters
        .iter()
        .find(|c| c.name() == name)
        .map(|c| c.as_mask().clone())
}

// Within one position, multiple chosen monomers OR together: the row matches
// when its category id is any of the chosen ids.
fn or_matching_rows(mask: &mut BitMask, column: &CategoricalColumn, chosen: &[String]) {
    let ids: Vec<u32> = chosen
        .iter()
        .filter_map(|monomer| column.category_index(monomer))
        .collect();
    if ids.is_empty() {
        return;
    }
    for (row, &value) in column.raw_data().iter().enumerate() {
        if ids.contains(&value) {
            mask.set(row, true);
        }
    }
}
