use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::Path;

use snafu::ResultExt;

use crate::filesystem::{EntryKind, Filesystem, LinkPolicy};
use crate::sync_error::{PathUnreadableSnafu, SyncError};

/// The entries directly inside one directory at the moment it was listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    entries: BTreeMap<OsString, EntryKind>,
}

impl DirectorySnapshot {
    pub fn capture<F: Filesystem + ?Sized>(
        fs: &F,
        dir: &Path,
        links: LinkPolicy,
    ) -> Result<Self, SyncError> {
        let entries = fs
            .list_dir(dir, links)
            .context(PathUnreadableSnafu {
                path: dir.to_path_buf(),
            })?
            .into_iter()
            .collect();
        Ok(Self { entries })
    }
}

impl FromIterator<(OsString, EntryKind)> for DirectorySnapshot {
    fn from_iter<T: IntoIterator<Item = (OsString, EntryKind)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Kinds of a name present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPair {
    pub source: EntryKind,
    pub replica: EntryKind,
}

impl EntryPair {
    pub fn is_mismatch(&self) -> bool {
        self.source != self.replica
    }
}

/// How the entries of a source directory relate to those of its replica.
///
/// Every name from either side lands in exactly one of the four groups.
/// Shared names are only `common_dirs` when both sides are directories;
/// anything else shared is a common file, carrying both kinds so that a
/// file/directory mismatch can be resolved by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub common_files: BTreeMap<OsString, EntryPair>,
    pub common_dirs: BTreeSet<OsString>,
    pub source_only: BTreeMap<OsString, EntryKind>,
    pub replica_only: BTreeMap<OsString, EntryKind>,
}

impl Classification {
    /// Lists both directories once and classifies their children.
    ///
    /// Source entries are typed through symbolic links, replica entries are
    /// not, so a replica link is never descended into.
    pub fn classify<F: Filesystem + ?Sized>(
        fs: &F,
        source_dir: &Path,
        replica_dir: &Path,
    ) -> Result<Self, SyncError> {
        let source = DirectorySnapshot::capture(fs, source_dir, LinkPolicy::Follow)?;
        let replica = DirectorySnapshot::capture(fs, replica_dir, LinkPolicy::Preserve)?;
        Ok(Self::from_snapshots(source, replica))
    }

    pub fn from_snapshots(source: DirectorySnapshot, replica: DirectorySnapshot) -> Self {
        let mut classification = Self::default();
        let mut replica_entries = replica.entries;

        for (name, source_kind) in source.entries {
            match replica_entries.remove(&name) {
                Some(EntryKind::Directory) if source_kind == EntryKind::Directory => {
                    classification.common_dirs.insert(name);
                }
                Some(replica_kind) => {
                    classification.common_files.insert(
                        name,
                        EntryPair {
                            source: source_kind,
                            replica: replica_kind,
                        },
                    );
                }
                None => {
                    classification.source_only.insert(name, source_kind);
                }
            }
        }

        classification.replica_only = replica_entries;
        classification
    }
}
