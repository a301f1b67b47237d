//! Applies the update/create/delete policy across a whole tree.

mod cancellation;
mod change_report;
mod reconciler;
mod sink;

pub use cancellation::CancellationToken;
pub use change_report::{Change, ChangeKind, ChangeReport};
pub use reconciler::Reconciler;
pub use sink::{ChangeSink, TracingSink};
