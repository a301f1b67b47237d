use std::path::{Path, PathBuf};

use derive_more::Display;
use snafu::Snafu;

use crate::ext::BestEffortPathExt;

/// The filesystem mutation that failed while writing to the replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WriteOperation {
    #[display("copy file to")]
    Copy,
    #[display("create directory")]
    CreateDir,
    #[display("remove file")]
    RemoveFile,
    #[display("remove directory")]
    RemoveDir,
}

/// Failures a synchronization pass can run into.
///
/// Everything except `RootUnreachable` is scoped to a single entry: the
/// reconciler reports it and moves on to the next entry.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SyncError {
    #[snafu(display("Cannot list directory {}: {source}", path.best_effort_path_display()))]
    PathUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Cannot read file {}: {source}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Cannot {operation} {}: {source}", path.best_effort_path_display()))]
    WriteError {
        path: PathBuf,
        operation: WriteOperation,
        source: std::io::Error,
    },
    #[snafu(display("Root {} is unreachable: {reason}", path.best_effort_path_display()))]
    RootUnreachable { path: PathBuf, reason: String },
}

impl SyncError {
    /// The path the failure is about.
    pub fn path(&self) -> &Path {
        match self {
            SyncError::PathUnreadable { path, .. }
            | SyncError::ReadError { path, .. }
            | SyncError::WriteError { path, .. }
            | SyncError::RootUnreachable { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_sync_error_display() {
        let read_error = SyncError::ReadError {
            path: PathBuf::from("/this/path/does/not/exist.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        };
        let write_error = SyncError::WriteError {
            path: PathBuf::from("/replica/sub"),
            operation: WriteOperation::RemoveDir,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let read_msg = read_error.to_string();
        assert!(read_msg.contains("Cannot read file"));
        assert!(read_msg.contains("/this/path/does/not/exist.txt"));
        assert!(read_msg.contains("file not found"));

        let write_msg = write_error.to_string();
        assert!(write_msg.starts_with("Cannot remove directory /replica/sub"));
        assert!(write_msg.contains("denied"));
    }

    #[test]
    fn test_sync_error_path() {
        let error = SyncError::RootUnreachable {
            path: PathBuf::from("/missing"),
            reason: "not a directory".into(),
        };
        assert_eq!(error.path(), Path::new("/missing"));
    }
}
