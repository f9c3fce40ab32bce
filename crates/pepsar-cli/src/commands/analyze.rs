use crate::cli::AnalyzeArgs;
use crate::config::{self, CliConfig};
use crate::error::Result;
use crate::ui::UiHandler;
use pepsar::core::io::csv;
use pepsar::engine::progress::ProgressReporter;
use pepsar::workflows::analyze;
use std::path::PathBuf;
use tracing::info;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let cli_config = CliConfig::load(&args.config)?;
    let mut settings = cli_config.to_settings()?;
    if let Some(scaling) = args.scaling.as_deref() {
        settings.scaling = config::parse_scaling(scaling)?;
    }
    if let Some(max_mutations) = args.max_mutations {
        settings.max_mutations = max_mutations;
    }
    if let Some(min_activity_delta) = args.min_activity_delta {
        settings.min_activity_delta = min_activity_delta;
    }

    let mut dataset = csv::read_dataset(&args.input)?;
    cli_config.apply_sequence_tags(&mut dataset);
    info!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "Dataset loaded."
    );

    let ui = UiHandler::new();
    let reporter = ProgressReporter::with_callback(ui.callback());
    let mut model = analyze::start(dataset, settings, reporter)?;

    let out_dir = args.output.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)?;

    let monomer_position = model.monomer_position_stats()?;
    let entry_count = monomer_position.entry_count();
    info!(
        positions = monomer_position.positions.len(),
        entries = entry_count,
        "Monomer-position table ready."
    );
    csv::write_monomer_position_stats(
        &out_dir.join("monomer_position_stats.csv"),
        monomer_position,
    )?;

    let clusters = model.cluster_stats()?;
    let cluster_count = clusters.original.len() + clusters.custom.len();
    info!(
        original = clusters.original.len(),
        custom = clusters.custom.len(),
        "Cluster table ready."
    );
    csv::write_cluster_stats(&out_dir.join("cluster_stats.csv"), clusters)?;

    let cliffs = model.mutation_cliffs()?;
    let pair_count = cliffs.pair_count();
    info!(pairs = pair_count, "Mutation cliffs ready.");
    csv::write_mutation_cliff_pairs(&out_dir.join("mutation_cliffs.csv"), cliffs)?;

    println!(
        "Exported {} monomer-position entries, {} clusters and {} cliff pairs to {}",
        entry_count,
        cluster_count,
        pair_count,
        out_dir.display()
    );
    Ok(())
}
