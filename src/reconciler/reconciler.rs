use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use snafu::ResultExt;
use tracing::{debug, info};

use super::{CancellationToken, ChangeKind, ChangeReport, ChangeSink};
use crate::differ::{self, EntryPair};
use crate::filesystem::{EntryKind, Filesystem, LinkPolicy};
use crate::fingerprint::content_equals;
use crate::sync_error::{ReadSnafu, RootUnreachableSnafu, SyncError, WriteOperation, WriteSnafu};

/// Mirrors a source tree onto a replica tree, one pass at a time.
pub struct Reconciler<F, S> {
    fs: F,
    sink: S,
    cancellation: CancellationToken,
}

/// Mutable state of a single pass.
#[derive(Default)]
struct Pass {
    report: ChangeReport,
    pending: VecDeque<(PathBuf, PathBuf)>,
}

impl<F: Filesystem, S: ChangeSink> Reconciler<F, S> {
    pub fn new(fs: F, sink: S) -> Self {
        Self {
            fs,
            sink,
            cancellation: CancellationToken::default(),
        }
    }

    /// Makes running passes stop early once `cancellation` fires.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Brings `replica` in line with `source`.
    ///
    /// Only an unusable root fails the pass. Errors on individual entries
    /// are reported to the sink, recorded in the report and skipped.
    pub fn reconcile(&self, source: &Path, replica: &Path) -> Result<ChangeReport, SyncError> {
        let mut pass = Pass::default();
        self.prepare_roots(source, replica, &mut pass)?;
        pass.pending
            .push_back((source.to_path_buf(), replica.to_path_buf()));

        // Subdirectories are queued rather than recursed into, so depth is
        // bounded by memory instead of the stack.
        while let Some((source_dir, replica_dir)) = pass.pending.pop_front() {
            if self.cancellation.is_cancelled() {
                info!(
                    "Pass cancelled with {} directories left to visit",
                    pass.pending.len() + 1
                );
                break;
            }
            self.reconcile_dir(&source_dir, &replica_dir, &mut pass);
        }

        Ok(pass.report)
    }

    fn prepare_roots(&self, source: &Path, replica: &Path, pass: &mut Pass) -> Result<(), SyncError> {
        match self.fs.entry_kind(source, LinkPolicy::Follow) {
            Ok(EntryKind::Directory) => {}
            Ok(EntryKind::File | EntryKind::Special) => {
                return RootUnreachableSnafu {
                    path: source.to_path_buf(),
                    reason: "not a directory",
                }
                .fail();
            }
            Err(e) => {
                return RootUnreachableSnafu {
                    path: source.to_path_buf(),
                    reason: e.to_string(),
                }
                .fail();
            }
        }

        match self.fs.entry_kind(replica, LinkPolicy::Follow) {
            Ok(EntryKind::Directory) => Ok(()),
            Ok(EntryKind::File | EntryKind::Special) => RootUnreachableSnafu {
                path: replica.to_path_buf(),
                reason: "not a directory",
            }
            .fail(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.fs
                    .create_dir_all(replica)
                    .map_err(|e| SyncError::RootUnreachable {
                        path: replica.to_path_buf(),
                        reason: format!("cannot be created: {e}"),
                    })?;
                self.record(pass, ChangeKind::CreatedDir, replica);
                Ok(())
            }
            Err(e) => RootUnreachableSnafu {
                path: replica.to_path_buf(),
                reason: e.to_string(),
            }
            .fail(),
        }
    }

    fn reconcile_dir(&self, source_dir: &Path, replica_dir: &Path, pass: &mut Pass) {
        debug!("Reconciling {}", replica_dir.display());

        let classification = match differ::classify(&self.fs, source_dir, replica_dir) {
            Ok(classification) => classification,
            Err(error) => {
                self.fail(pass, error);
                return;
            }
        };

        for (name, pair) in &classification.common_files {
            let result =
                self.update_entry(&source_dir.join(name), &replica_dir.join(name), *pair, pass);
            self.absorb(pass, result);
        }

        for (name, kind) in &classification.source_only {
            let result = self.create_entry(&source_dir.join(name), &replica_dir.join(name), *kind, pass);
            self.absorb(pass, result);
        }

        for (name, kind) in &classification.replica_only {
            let result = self.remove_entry(&replica_dir.join(name), *kind, pass);
            self.absorb(pass, result);
        }

        for name in &classification.common_dirs {
            pass.pending
                .push_back((source_dir.join(name), replica_dir.join(name)));
        }
    }

    /// Handles a name present on both sides that is not a directory on both.
    fn update_entry(
        &self,
        source: &Path,
        replica: &Path,
        pair: EntryPair,
        pass: &mut Pass,
    ) -> Result<(), SyncError> {
        if pair.source == EntryKind::Special {
            return Self::refuse_special(source);
        }

        if pair.is_mismatch() {
            debug!(
                "{} is a {} in the replica but a {} in the source",
                replica.display(),
                pair.replica,
                pair.source
            );
            self.remove_entry(replica, pair.replica, pass)?;
            return self.create_entry(source, replica, pair.source, pass);
        }

        let equal = match content_equals(&self.fs, source, replica) {
            Ok(equal) => equal,
            // A replica copy that cannot be read, such as a dangling link, is
            // simply overwritten.
            Err(SyncError::ReadError { path, .. }) if path == replica => false,
            Err(error) => return Err(error),
        };

        if !equal {
            self.copy(source, replica)?;
            self.record(pass, ChangeKind::Updated, replica);
        }
        Ok(())
    }

    fn create_entry(
        &self,
        source: &Path,
        replica: &Path,
        kind: EntryKind,
        pass: &mut Pass,
    ) -> Result<(), SyncError> {
        match kind {
            EntryKind::Directory => {
                self.fs.create_dir_all(replica).context(WriteSnafu {
                    path: replica.to_path_buf(),
                    operation: WriteOperation::CreateDir,
                })?;
                self.record(pass, ChangeKind::CreatedDir, replica);
                // Queued only once the directory exists.
                pass.pending
                    .push_back((source.to_path_buf(), replica.to_path_buf()));
            }
            EntryKind::File => {
                self.copy(source, replica)?;
                self.record(pass, ChangeKind::Created, replica);
            }
            EntryKind::Special => return Self::refuse_special(source),
        }
        Ok(())
    }

    fn remove_entry(&self, replica: &Path, kind: EntryKind, pass: &mut Pass) -> Result<(), SyncError> {
        match kind {
            EntryKind::Directory => {
                self.fs.remove_dir_all(replica).context(WriteSnafu {
                    path: replica.to_path_buf(),
                    operation: WriteOperation::RemoveDir,
                })?;
                self.record(pass, ChangeKind::RemovedDir, replica);
            }
            EntryKind::File | EntryKind::Special => {
                self.fs.remove_file(replica).context(WriteSnafu {
                    path: replica.to_path_buf(),
                    operation: WriteOperation::RemoveFile,
                })?;
                self.record(pass, ChangeKind::RemovedFile, replica);
            }
        }
        Ok(())
    }

    fn copy(&self, source: &Path, replica: &Path) -> Result<(), SyncError> {
        self.fs.copy_file(source, replica).or_else(|copy_error| {
            // Blame the source when it cannot even be opened, the replica otherwise.
            self.fs.open_read(source).context(ReadSnafu {
                path: source.to_path_buf(),
            })?;
            Err(copy_error).context(WriteSnafu {
                path: replica.to_path_buf(),
                operation: WriteOperation::Copy,
            })
        })
    }

    /// FIFOs and device nodes can block a reader indefinitely, so they are
    /// reported instead of opened.
    fn refuse_special(source: &Path) -> Result<(), SyncError> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "special files are not mirrored",
        ))
        .context(ReadSnafu {
            path: source.to_path_buf(),
        })
    }

    fn record(&self, pass: &mut Pass, kind: ChangeKind, path: &Path) {
        let change = pass.report.push_change(kind, path);
        self.sink.change(change);
    }

    fn absorb(&self, pass: &mut Pass, result: Result<(), SyncError>) {
        if let Err(error) = result {
            self.fail(pass, error);
        }
    }

    fn fail(&self, pass: &mut Pass, error: SyncError) {
        self.sink.failure(&error);
        pass.report.push_failure(error.path());
    }
}
