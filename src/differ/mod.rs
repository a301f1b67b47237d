//! Single-level comparison of a source directory with its replica.

mod classification;

use std::path::Path;

pub use classification::{Classification, EntryPair};

use crate::filesystem::Filesystem;
use crate::sync_error::SyncError;

/// Classifies the immediate children of `source_dir` against `replica_dir`.
pub fn classify<F: Filesystem + ?Sized>(
    fs: &F,
    source_dir: &Path,
    replica_dir: &Path,
) -> Result<Classification, SyncError> {
    Classification::classify(fs, source_dir, replica_dir)
}
