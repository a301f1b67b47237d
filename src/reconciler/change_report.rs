use std::path::{Path, PathBuf};

use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ChangeKind {
    #[display("Updated file")]
    Updated,
    #[display("Created file")]
    Created,
    #[display("Removed file")]
    RemovedFile,
    #[display("Removed directory")]
    RemovedDir,
    #[display("Created directory")]
    CreatedDir,
}

/// One mutation applied to the replica.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{}: {}", kind, path.display())]
pub struct Change {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

/// An entry that was skipped because of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
}

/// Everything a single pass did to the replica, in the order it happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    changes: Vec<Change>,
    failures: Vec<Failure>,
}

impl ChangeReport {
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// True when the pass left the replica untouched.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|change| change.kind == kind).count()
    }

    pub(crate) fn push_change(&mut self, kind: ChangeKind, path: &Path) -> &Change {
        self.changes.push(Change {
            kind,
            path: path.to_path_buf(),
        });
        &self.changes[self.changes.len() - 1]
    }

    pub(crate) fn push_failure(&mut self, path: &Path) {
        self.failures.push(Failure {
            path: path.to_path_buf(),
        });
    }
}
