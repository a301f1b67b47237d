use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use futures::future::{Either, select};
use futures_channel::oneshot::Canceled;
use snafu::{ResultExt, Snafu};
use tracing::{debug, error, info};

use crate::filesystem::Filesystem;
use crate::reconciler::{CancellationToken, ChangeKind, ChangeReport, ChangeSink, Reconciler};
use crate::sync_error::SyncError;

type PassResult = Result<ChangeReport, SyncError>;

/// Runs synchronization passes one after another with a fixed pause between them.
///
/// Passes execute on a dedicated dispatcher thread so that the runtime thread
/// stays free to notice a shutdown request while a pass is in flight.
pub struct Scheduler<F, S> {
    dispatcher: Dispatcher,
    reconciler: Arc<Reconciler<F, S>>,
    cancellation: CancellationToken,
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
}

impl<F, S> Scheduler<F, S>
where
    F: Filesystem + 'static,
    S: ChangeSink + 'static,
{
    pub fn new(
        reconciler: Reconciler<F, S>,
        source: PathBuf,
        replica: PathBuf,
        interval: Duration,
    ) -> Result<Self, SchedulerCreationError> {
        // One pass at a time, so one worker is all it takes.
        let dispatcher = DispatcherBuilder::new()
            .worker_threads(NonZeroUsize::MIN)
            .build()
            .context(DispatcherSnafu)?;

        let cancellation = CancellationToken::default();
        let reconciler = Arc::new(reconciler.with_cancellation(cancellation.clone()));

        Ok(Self {
            dispatcher,
            reconciler,
            cancellation,
            source,
            replica,
            interval,
        })
    }

    /// Repeats passes until `shutdown` resolves.
    ///
    /// A shutdown during the wait returns at once. A shutdown during a pass
    /// cancels it and waits for the file operation in progress to finish.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<(), SchedulerError> {
        let mut shutdown = pin!(shutdown);

        loop {
            let mut pass = self.dispatch_pass()?;

            match select(&mut pass, shutdown.as_mut()).await {
                Either::Left((outcome, _)) => {
                    Self::log_outcome(outcome);
                }
                Either::Right(((), running)) => {
                    info!("Stop requested, letting the running pass wind down");
                    self.cancellation.cancel();
                    Self::log_outcome(running.await);
                    return Ok(());
                }
            }

            debug!("Next pass in {}s", self.interval.as_secs());
            let wait = pin!(compio::time::sleep(self.interval));
            if let Either::Right(_) = select(wait, shutdown.as_mut()).await {
                return Ok(());
            }
        }
    }

    /// Runs exactly one pass.
    pub async fn run_once(&self) -> Result<Option<ChangeReport>, SchedulerError> {
        let pass = self.dispatch_pass()?;
        Ok(Self::log_outcome(pass.await))
    }

    fn dispatch_pass(
        &self,
    ) -> Result<impl Future<Output = Result<PassResult, Canceled>> + Unpin, SchedulerError> {
        let reconciler = self.reconciler.clone();
        let source = self.source.clone();
        let replica = self.replica.clone();

        debug!("Dispatching pass for {}", replica.display());
        self.dispatcher
            .dispatch(move || async move { reconciler.reconcile(&source, &replica) })
            .map_err(|e| SchedulerError::PassDispatchError {
                error: e.to_string(),
            })
    }

    fn log_outcome(outcome: Result<PassResult, Canceled>) -> Option<ChangeReport> {
        match outcome {
            Ok(Ok(report)) => {
                if report.is_empty() && report.failures().is_empty() {
                    info!("Pass finished, replica already up to date");
                } else {
                    info!(
                        "Pass finished: {} changes ({} updated, {} created, {} directories created, {} files removed, {} directories removed), {} entries skipped",
                        report.changes().len(),
                        report.count(ChangeKind::Updated),
                        report.count(ChangeKind::Created),
                        report.count(ChangeKind::CreatedDir),
                        report.count(ChangeKind::RemovedFile),
                        report.count(ChangeKind::RemovedDir),
                        report.failures().len()
                    );
                }
                Some(report)
            }
            Ok(Err(error)) => {
                error!("Pass skipped: {error}");
                None
            }
            Err(e) => {
                error!("Pass worker went away before reporting: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SchedulerCreationError {
    #[snafu(display("Failed to create pass dispatcher"))]
    DispatcherError { source: std::io::Error },
}

#[derive(Debug, Snafu)]
pub enum SchedulerError {
    #[snafu(display("Failed to dispatch synchronization pass: {}", error))]
    PassDispatchError { error: String },
}
