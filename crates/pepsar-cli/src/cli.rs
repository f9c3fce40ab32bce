use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The pepsar developers",
    version,
    about = "pepsar CLI - Batch sequence-activity-relationship statistics for peptide datasets: monomer-position enrichment, cluster statistics, and mutation-cliff mining.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full SAR analysis and export all statistics tables.
    Analyze(AnalyzeArgs),
    /// Mine mutation cliffs only and export the qualifying pairs.
    Cliffs(CliffsArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the input dataset in CSV format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Directory for the exported statistics tables. Defaults to the current directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Override the activity scaling from the config file ('none', 'lg' or '-lg').
    #[arg(short, long, value_name = "SCALING")]
    pub scaling: Option<String>,

    /// Override the maximum number of mutations per cliff pair.
    #[arg(long, value_name = "INT")]
    pub max_mutations: Option<usize>,

    /// Override the minimum activity difference per cliff pair.
    #[arg(long, value_name = "FLOAT")]
    pub min_activity_delta: Option<f64>,
}

/// Arguments for the `cliffs` subcommand.
#[derive(Args, Debug)]
pub struct CliffsArgs {
    /// Path to the input dataset in CSV format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the exported cliff-pair table.
    #[arg(short, long, value_name = "PATH", default_value = "mutation_cliffs.csv")]
    pub output: PathBuf,

    /// Override the maximum number of mutations per cliff pair.
    #[arg(long, value_name = "INT")]
    pub max_mutations: Option<usize>,

    /// Override the minimum activity difference per cliff pair.
    #[arg(long, value_name = "FLOAT")]
    pub min_activity_delta: Option<f64>,

    /// Restrict mining to rows of one category of this column.
    #[arg(long, value_name = "COLUMN", requires = "target")]
    pub target_column: Option<String>,

    /// The target category to restrict mining to.
    #[arg(long, value_name = "VALUE", requires = "target_column")]
    pub target: Option<String>,
}
