use snafu::Snafu;
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::application::RuntimeConfig;
use crate::application::logging::LoggingError;
use crate::ext::BestEffortPathExt;
use crate::filesystem::LocalFilesystem;
use crate::reconciler::{Reconciler, TracingSink};
use crate::scheduler::{Scheduler, SchedulerCreationError, SchedulerError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();

        ensure!(
            !app_config.source.overlaps(&app_config.replica),
            OverlappingRootsSnafu {
                source_root: app_config.source.clone(),
                replica_root: app_config.replica.clone(),
            }
        );

        info!(
            "Synchronization started - source: {}, replica: {}, interval: {}s",
            app_config.source.best_effort_path_display(),
            app_config.replica.best_effort_path_display(),
            app_config.interval.as_secs()
        );

        let scheduler = Scheduler::new(
            Reconciler::new(LocalFilesystem, TracingSink),
            app_config.source.clone(),
            app_config.replica.clone(),
            app_config.interval,
        )
        .context(SchedulerCreationSnafu)?;

        if app_config.once {
            scheduler.run_once().await.context(SchedulingSnafu)?;
            info!("Single pass complete");
        } else {
            scheduler
                .run(shutdown_signal())
                .await
                .context(SchedulingSnafu)?;
            info!("Synchronization stopped by user");
        }

        Ok(())
    }
}

/// Resolves on the first interrupt. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    match compio::signal::ctrl_c().await {
        Ok(()) => debug!("Received interrupt signal"),
        Err(e) => {
            error!("Cannot listen for interrupt signal, running until killed: {e}");
            futures::future::pending::<()>().await;
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while setting up logging"))]
    LoggingError { source: LoggingError },
    #[snafu(display(
        "Replica {} and source {} overlap, refusing to mirror a tree into itself",
        replica_root.best_effort_path_display(),
        source_root.best_effort_path_display()
    ))]
    OverlappingRoots {
        source_root: PathBuf,
        replica_root: PathBuf,
    },
    #[snafu(display("Critical failure encountered during scheduler creation"))]
    SchedulerCreationError { source: SchedulerCreationError },
    #[snafu(display("Critical failure encountered while scheduling passes"))]
    SchedulingError { source: SchedulerError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::data::LogLevel;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(source: PathBuf, replica: PathBuf, log_file: PathBuf) -> RuntimeConfig {
        RuntimeConfig {
            source,
            replica,
            interval: Duration::from_secs(1),
            log_file,
            log_level: LogLevel::Info,
            once: true,
        }
    }

    #[compio::test]
    async fn test_rejects_replica_inside_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().to_path_buf();
        let replica = source.join("replica");

        let result = Application::run(config(source, replica.clone(), temp_dir.path().join("log"))).await;

        assert!(matches!(result, Err(ApplicationError::OverlappingRoots { .. })));
        assert!(!replica.exists());
    }

    #[compio::test]
    async fn test_single_pass_mirrors_tree() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("source");
        let replica = temp_dir.path().join("replica");
        fs::create_dir_all(source.join("sub")).expect("Failed to create source tree");
        fs::write(source.join("sub/b.txt"), "b").expect("Failed to write file");

        Application::run(config(source, replica.clone(), temp_dir.path().join("log")))
            .await
            .expect("Application failed");

        assert_eq!(fs::read_to_string(replica.join("sub/b.txt")).unwrap(), "b");
    }
}
