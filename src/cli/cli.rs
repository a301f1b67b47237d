use std::num::NonZeroU64;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Periodically mirror a source directory onto a replica directory.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Directory to mirror from. It is only ever read.
    pub source: PathBuf,
    /// Directory to mirror into. Anything not in the source is removed.
    pub replica: PathBuf,
    /// Seconds to wait between synchronization passes
    pub interval: NonZeroU64,
    /// File that every logged action is appended to
    pub log_file: PathBuf,
    #[clap(long, short, default_value = "info", value_enum)]
    pub log_level: LogLevel,

    /// Run a single pass and exit
    #[clap(long)]
    pub once: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parses_positional_arguments() {
        let cli = Cli::try_parse_from(["mirror-sync", "src", "replica", "30", "sync.log"])
            .expect("Failed to parse arguments");

        assert_eq!(cli.source, PathBuf::from("src"));
        assert_eq!(cli.replica, PathBuf::from("replica"));
        assert_eq!(cli.interval.get(), 30);
        assert_eq!(cli.log_file, PathBuf::from("sync.log"));
        assert!(matches!(cli.log_level, LogLevel::Info));
        assert!(!cli.once);
    }

    #[test]
    fn test_parses_options() {
        let cli = Cli::try_parse_from([
            "mirror-sync",
            "src",
            "replica",
            "5",
            "sync.log",
            "--log-level",
            "silent",
            "--once",
        ])
        .expect("Failed to parse arguments");

        assert!(matches!(cli.log_level, LogLevel::Silent));
        assert!(cli.once);
    }

    #[rstest]
    #[case(&["mirror-sync", "src", "replica", "0", "sync.log"])]
    #[case(&["mirror-sync", "src", "replica", "-3", "sync.log"])]
    #[case(&["mirror-sync", "src", "replica", "1.5", "sync.log"])]
    #[case(&["mirror-sync", "src", "replica", "10"])]
    fn test_rejects_invalid_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
