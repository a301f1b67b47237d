//! Filesystem capability consumed by the mirroring core.
//!
//! The reconciler only ever talks to the [`Filesystem`] trait, so the local
//! disk implementation can be swapped for doubles in tests.

mod filesystem;
mod local;

pub use filesystem::{EntryKind, Filesystem, LinkPolicy};
pub use local::LocalFilesystem;
