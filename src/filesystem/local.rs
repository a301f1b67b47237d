use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use filetime::FileTime;

use super::{EntryKind, Filesystem, LinkPolicy};

/// [`Filesystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn list_dir(&self, dir: &Path, links: LinkPolicy) -> io::Result<Vec<(OsString, EntryKind)>> {
        fs::read_dir(dir)?
            .map(|entry| {
                let entry = entry?;
                let file_type = entry.file_type()?;
                let kind = if file_type.is_symlink() && links == LinkPolicy::Follow {
                    // A dangling link has nothing to descend into, so it is a file.
                    fs::metadata(entry.path())
                        .map(|metadata| EntryKind::from(metadata.file_type()))
                        .unwrap_or(EntryKind::File)
                } else {
                    EntryKind::from(file_type)
                };
                Ok((entry.file_name(), kind))
            })
            .collect()
    }

    fn entry_kind(&self, path: &Path, links: LinkPolicy) -> io::Result<EntryKind> {
        let metadata = match links {
            LinkPolicy::Follow => fs::metadata(path)?,
            LinkPolicy::Preserve => fs::symlink_metadata(path)?,
        };
        Ok(EntryKind::from(metadata.file_type()))
    }

    fn open_read<'a>(&'a self, path: &Path) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(File::open(path)?))
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        // Writing through a replica-side link would land outside the replica.
        if fs::symlink_metadata(to).is_ok_and(|metadata| metadata.file_type().is_symlink()) {
            fs::remove_file(to)?;
        }

        fs::copy(from, to)?;

        let modified = FileTime::from_last_modification_time(&fs::metadata(from)?);
        filetime::set_file_mtime(to, modified)
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::remove_dir_all(dir)
    }
}
