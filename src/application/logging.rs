use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use snafu::{ResultExt, Snafu};
use supports_color::Stream;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{Layer, fmt};

use crate::application::RuntimeConfig;
use crate::ext::BestEffortPathExt;

/// Sends every event to the log file and, unless silenced, to the console.
///
/// The file receives plain lines at the console's level, or `info` when the
/// console is silent. Both streams carry a timestamp and the level.
pub fn setup_tracing(config: &RuntimeConfig) -> Result<(), LoggingError> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .context(LogFileSnafu {
            path: config.log_file.clone(),
        })?;

    let console_level = config.log_level.to_tracing_level();
    let file_level = console_level.unwrap_or(Level::INFO);

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::from_level(file_level));

    let console_layer = console_level.map(|level| {
        fmt::layer()
            .with_ansi(supports_color::on(Stream::Stdout).is_some())
            .with_target(false)
            .with_filter(LevelFilter::from_level(level))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context(SubscriberSnafu)
}

#[derive(Debug, Snafu)]
pub enum LoggingError {
    #[snafu(display("Cannot open log file {}", path.best_effort_path_display()))]
    LogFileError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to install the log subscriber"))]
    SubscriberError { source: TryInitError },
}
