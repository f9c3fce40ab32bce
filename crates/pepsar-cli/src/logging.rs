use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
};

fn verbosity_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global tracing subscriber: a compact stderr layer filtered by
/// the `-v`/`-q` flags, plus an unfiltered plain-text file layer when a log
/// file is requested.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(verbosity_filter(verbosity, quiet));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    match log_file {
        Some(path) => {
            let file = File::create(&path).map_err(CliError::Io)?;
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, info, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn quiet_wins_over_any_verbosity() {
        assert_eq!(verbosity_filter(0, true), LevelFilter::OFF);
        assert_eq!(verbosity_filter(3, true), LevelFilter::OFF);
    }

    #[test]
    fn verbosity_maps_to_increasing_levels() {
        assert_eq!(verbosity_filter(0, false), LevelFilter::WARN);
        assert_eq!(verbosity_filter(1, false), LevelFilter::INFO);
        assert_eq!(verbosity_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(verbosity_filter(3, false), LevelFilter::TRACE);
        assert_eq!(verbosity_filter(7, false), LevelFilter::TRACE);
    }

    #[test]
    #[serial]
    fn global_initialization_and_macros_work() {
        ensure_global_logger_is_set();

        warn!("warning through the global subscriber");
        info!("info through the global subscriber");
        debug!("debug through the global subscriber");
    }

    #[test]
    #[serial]
    fn file_layer_captures_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("session.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer().with_writer(file).with_ansi(false);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            info!("record destined for the session log");
        });

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("record destined for the session log"));
        assert!(content.contains("INFO"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_propagates_io_error() {
        let directory_as_file = PathBuf::from("/");

        if cfg!(unix) && directory_as_file.is_dir() {
            let result = setup_logging(0, false, Some(directory_as_file));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
