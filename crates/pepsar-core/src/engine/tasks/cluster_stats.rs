use crate::core::models::column::{BooleanColumn, CategoricalColumn};
use crate::core::stats::summary::compute_stats;
use crate::core::stats::tables::ClusterTypeStats;
use tracing::{info, instrument};

/// Builds the cluster statistics table.
///
/// Original clusters come from a categorical column, one mask per distinct
/// category; custom clusters are boolean columns whose bits wrap directly as
/// masks with no category lookup.
#[instrument(skip_all, name = "cluster_stats_task")]
pub fn run(
    activity: &[f64],
    original_clusters: Option<&CategoricalColumn>,
    custom_clusters: &[BooleanColumn],
) -> ClusterTypeStats {
    let mut table = ClusterTypeStats::default();

    if let Some(column) = original_clusters {
        for (id, name) in column.categories().iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let mask = column.category_mask(id as u32);
            table
                .original
                .insert(name.clone(), compute_stats(activity, &mask));
        }
    }

    for column in custom_clusters {
        table
            .custom
            .insert(column.name().to_string(), compute_stats(activity, column.as_mask()));
    }

    info!(
        original = table.original.len(),
        custom = table.custom.len(),
        "Cluster statistics computed."
    );
    table
}
