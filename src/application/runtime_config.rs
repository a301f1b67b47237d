use std::path::PathBuf;
use std::time::Duration;

use crate::application::data::LogLevel;
use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval: Duration,
    pub log_file: PathBuf,
    pub log_level: LogLevel,
    pub once: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            source: cli.source,
            replica: cli.replica,
            interval: Duration::from_secs(cli.interval.get()),
            log_file: cli.log_file,
            log_level: cli.log_level,
            once: cli.once,
        }
    }
}
