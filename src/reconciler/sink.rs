use std::sync::Arc;

use tracing::{info, warn};

use super::Change;
use crate::sync_error::SyncError;

/// Receives every change and failure of a pass as it happens.
///
/// The reconciler is handed a sink at construction; production code logs
/// through [`TracingSink`] while tests can capture events in memory.
pub trait ChangeSink: Send + Sync {
    fn change(&self, change: &Change);
    fn failure(&self, error: &SyncError);
}

/// Emits changes as `info` events and failures as `warn` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ChangeSink for TracingSink {
    fn change(&self, change: &Change) {
        info!("{change}");
    }

    fn failure(&self, error: &SyncError) {
        warn!("Skipping {}: {error}", error.path().display());
    }
}

impl<S: ChangeSink + ?Sized> ChangeSink for Arc<S> {
    fn change(&self, change: &Change) {
        (**self).change(change);
    }

    fn failure(&self, error: &SyncError) {
        (**self).failure(error);
    }
}
