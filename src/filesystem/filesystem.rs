use std::ffi::OsString;
use std::fs::FileType;
use std::io::{self, Read};
use std::path::Path;

use derive_more::Display;

/// What an entry is, as far as mirroring cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntryKind {
    /// A regular file, or a symbolic link typed without being followed.
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
    /// A FIFO, socket or device node. Never opened, since reads may block.
    #[display("special file")]
    Special,
}

impl From<FileType> for EntryKind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else if is_special(&file_type) {
            EntryKind::Special
        } else {
            EntryKind::File
        }
    }
}

#[cfg(unix)]
fn is_special(file_type: &FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;

    file_type.is_fifo()
        || file_type.is_socket()
        || file_type.is_block_device()
        || file_type.is_char_device()
}

#[cfg(not(unix))]
fn is_special(_file_type: &FileType) -> bool {
    false
}

/// Whether symbolic links are resolved when typing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Type an entry by what it points to.
    Follow,
    /// Type a link as the link itself, which is never a directory.
    Preserve,
}

/// The filesystem primitives a synchronization pass is built from.
///
/// Any backing store offering these operations can be mirrored, which
/// keeps the reconciler testable against doubles that inject failures.
pub trait Filesystem: Send + Sync {
    /// Lists the immediate children of `dir` with their kinds.
    fn list_dir(&self, dir: &Path, links: LinkPolicy) -> io::Result<Vec<(OsString, EntryKind)>>;

    fn entry_kind(&self, path: &Path, links: LinkPolicy) -> io::Result<EntryKind>;

    /// Opens a file for streaming reads.
    fn open_read<'a>(&'a self, path: &Path) -> io::Result<Box<dyn Read + 'a>>;

    fn file_len(&self, path: &Path) -> io::Result<u64>;

    /// Copies `from` over `to`, carrying the source's modification time.
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Creates `dir` and any missing parents. Succeeds if it already exists.
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Removes `dir` and everything beneath it.
    fn remove_dir_all(&self, dir: &Path) -> io::Result<()>;
}
