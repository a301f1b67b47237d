use std::io::{self, ErrorKind, Read};
use std::path::Path;

use snafu::ResultExt;
use tracing::debug;

use crate::filesystem::Filesystem;
use crate::sync_error::{ReadSnafu, SyncError};

/// Files are hashed in chunks of this size so memory stays bounded.
const CHUNK_SIZE: usize = 64 * 1024;

/// BLAKE3 digest of a file's bytes.
///
/// Metadata plays no part: two files with the same content always share a
/// fingerprint. Different contents sharing one would take a BLAKE3
/// collision, which is treated as impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileFingerprint(blake3::Hash);

impl FileFingerprint {
    pub fn compute<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> Result<Self, SyncError> {
        let reader = fs.open_read(path).context(ReadSnafu {
            path: path.to_path_buf(),
        })?;

        Self::from_reader(reader).context(ReadSnafu {
            path: path.to_path_buf(),
        })
    }

    pub fn from_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => {
                    hasher.update(&buffer[..read]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(Self(hasher.finalize()))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

/// Whether two files hold the same bytes.
///
/// Lengths are compared first; only same-sized files are hashed.
pub fn content_equals<F: Filesystem + ?Sized>(
    fs: &F,
    left: &Path,
    right: &Path,
) -> Result<bool, SyncError> {
    let left_len = fs.file_len(left).context(ReadSnafu {
        path: left.to_path_buf(),
    })?;
    let right_len = fs.file_len(right).context(ReadSnafu {
        path: right.to_path_buf(),
    })?;

    if left_len != right_len {
        return Ok(false);
    }

    let left_fingerprint = FileFingerprint::compute(fs, left)?;
    let right_fingerprint = FileFingerprint::compute(fs, right)?;
    if left_fingerprint != right_fingerprint {
        debug!(
            "Content of {} ({}) differs from {} ({})",
            left.display(),
            left_fingerprint.to_hex(),
            right.display(),
            right_fingerprint.to_hex()
        );
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::LocalFilesystem;
    use rstest::*;
    use std::io::{Cursor, Write};
    use tempfile::{NamedTempFile, TempDir};

    fn temp_file_with(content: &[u8]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file.write_all(content).expect("Failed to write to temp file");
        temp_file.flush().expect("Failed to flush temp file");
        temp_file
    }

    #[test]
    fn test_file_fingerprint_same_content_same_fingerprint() {
        let temp_file1 = temp_file_with(b"identical content");
        let temp_file2 = temp_file_with(b"identical content");

        let fingerprint1 = FileFingerprint::compute(&LocalFilesystem, temp_file1.path())
            .expect("Failed to create fingerprint 1");
        let fingerprint2 = FileFingerprint::compute(&LocalFilesystem, temp_file2.path())
            .expect("Failed to create fingerprint 2");

        assert_eq!(fingerprint1, fingerprint2);
    }

    #[test]
    fn test_file_fingerprint_ignores_modification_time() {
        let temp_file = temp_file_with(b"stable content");
        let before = FileFingerprint::compute(&LocalFilesystem, temp_file.path())
            .expect("Failed to create first fingerprint");

        filetime::set_file_mtime(temp_file.path(), filetime::FileTime::from_unix_time(0, 0))
            .expect("Failed to set mtime");
        let after = FileFingerprint::compute(&LocalFilesystem, temp_file.path())
            .expect("Failed to create second fingerprint");

        assert_eq!(before, after);
    }

    #[test]
    fn test_file_fingerprint_matches_one_shot_hash() {
        // Spans several chunks with a ragged tail.
        let content = (0..CHUNK_SIZE * 3 + 17)
            .map(|i| (i % 251) as u8)
            .collect::<Vec<_>>();

        let fingerprint = FileFingerprint::from_reader(Cursor::new(&content))
            .expect("Failed to fingerprint reader");

        assert_eq!(fingerprint.to_hex(), blake3::hash(&content).to_hex().to_string());
    }

    #[test]
    fn test_file_fingerprint_from_nonexistent_file() {
        let nonexistent_path = Path::new("/this/path/does/not/exist.txt");

        let result = FileFingerprint::compute(&LocalFilesystem, nonexistent_path);

        match result {
            Err(SyncError::ReadError { path, .. }) => assert_eq!(path, nonexistent_path),
            other => panic!("Expected ReadError, got {other:?}"),
        }
    }

    #[test]
    fn test_file_fingerprint_from_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let result = FileFingerprint::compute(&LocalFilesystem, temp_dir.path());

        assert!(matches!(result, Err(SyncError::ReadError { .. })));
    }

    #[rstest]
    #[case(b"hello world", b"hello world", true)]
    #[case(b"", b"", true)]
    #[case(b"hello world", b"hello there", false)]
    #[case(b"short", b"longer content", false)]
    #[case("special chars: äöü🚀".as_bytes(), "special chars: äöü🚀".as_bytes(), true)]
    fn test_content_equals(#[case] left: &[u8], #[case] right: &[u8], #[case] expected: bool) {
        let left_file = temp_file_with(left);
        let right_file = temp_file_with(right);

        let equal = content_equals(&LocalFilesystem, left_file.path(), right_file.path())
            .expect("Failed to compare files");

        assert_eq!(equal, expected);
    }

    #[test]
    fn test_content_equals_large_files_differing_at_the_end() {
        let mut left = vec![b'x'; 1024 * 1024];
        let mut right = left.clone();
        left.push(b'a');
        right.push(b'b');

        let left_file = temp_file_with(&left);
        let right_file = temp_file_with(&right);

        let equal = content_equals(&LocalFilesystem, left_file.path(), right_file.path())
            .expect("Failed to compare files");

        assert!(!equal);
    }

    #[test]
    fn test_content_equals_missing_side() {
        let present = temp_file_with(b"content");
        let missing = Path::new("/this/path/does/not/exist.txt");

        let result = content_equals(&LocalFilesystem, present.path(), missing);

        assert!(matches!(result, Err(SyncError::ReadError { .. })));
    }
}
