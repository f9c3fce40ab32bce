use crate::cli::CliffsArgs;
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::ui::UiHandler;
use pepsar::core::io::csv;
use pepsar::engine::config::TargetFilter;
use pepsar::engine::progress::ProgressReporter;
use pepsar::workflows::{analyze, mine};
use tracing::info;

pub fn run(args: CliffsArgs) -> Result<()> {
    let cli_config = CliConfig::load(&args.config)?;
    let mut settings = cli_config.to_settings()?;
    if let Some(max_mutations) = args.max_mutations {
        settings.max_mutations = max_mutations;
    }
    if let Some(min_activity_delta) = args.min_activity_delta {
        settings.min_activity_delta = min_activity_delta;
    }
    let cliff_settings = settings.cliff_settings();

    let mut dataset = csv::read_dataset(&args.input)?;
    cli_config.apply_sequence_tags(&mut dataset);

    let ui = UiHandler::new();
    let reporter = ProgressReporter::with_callback(ui.callback());
    // the analyze workflow does the validation and splitting; tables stay lazy
    let mut model = analyze::start(dataset, settings, reporter)?;

    let cliffs = match (&args.target_column, &args.target) {
        (Some(column_name), Some(target)) => {
            let activity = model.scaled_activity()?.to_vec();
            let column = model
                .dataset()
                .column(column_name)
                .and_then(|c| c.as_categorical())
                .ok_or_else(|| {
                    CliError::Argument(format!(
                        "target column '{column_name}' is missing or not categorical"
                    ))
                })?;
            let filter = TargetFilter { column, target };
            mine::run(
                &activity,
                model.position_columns(),
                &cliff_settings,
                Some(&filter),
                &ProgressReporter::with_callback(ui.callback()),
            )
        }
        _ => model.mutation_cliffs()?.clone(),
    };

    info!(pairs = cliffs.pair_count(), "Mutation cliffs mined.");
    csv::write_mutation_cliff_pairs(&args.output, &cliffs)?;

    println!(
        "Exported {} cliff pairs to {}",
        cliffs.pair_count(),
        args.output.display()
    );
    Ok(())
}
