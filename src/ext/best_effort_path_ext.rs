use std::path::{Component, Path, PathBuf};

/// Resolves `path` to an absolute form without requiring it to exist.
///
/// Canonicalization is attempted first so symbolic links are resolved when
/// the path is present. A missing path is joined onto the current directory
/// and normalized lexically instead.
pub fn best_effort_absolute(path: &Path) -> PathBuf {
    if let Ok(canonical_path) = path.canonicalize() {
        return canonical_path;
    }

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(current_dir) => current_dir.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    normalize_path(&absolute_path)
}

pub fn best_effort_path_display(path: &Path) -> String {
    best_effort_absolute(path).display().to_string()
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !components.is_empty() && !matches!(components.last(), Some(Component::RootDir))
                {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;

    /// True when one path is equal to, or nested inside, the other.
    fn overlaps(&self, other: &Path) -> bool;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }

    fn overlaps(&self, other: &Path) -> bool {
        let this = best_effort_absolute(self);
        let other = best_effort_absolute(other);
        this.starts_with(&other) || other.starts_with(&this)
    }
}

impl BestEffortPathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        self.as_path().best_effort_path_display()
    }

    fn overlaps(&self, other: &Path) -> bool {
        self.as_path().overlaps(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b/./c", "/a/b/c")]
    #[case("/a/b/../c", "/a/c")]
    #[case("/../a", "/a")]
    #[case("/a/b/c/../../d", "/a/d")]
    fn test_normalize_path(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_path(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case("/nonexistent/src", "/nonexistent/src", true)]
    #[case("/nonexistent/src", "/nonexistent/src/replica", true)]
    #[case("/nonexistent/src/replica", "/nonexistent/src", true)]
    #[case("/nonexistent/src", "/nonexistent/srcreplica", false)]
    #[case("/nonexistent/src", "/nonexistent/replica", false)]
    fn test_overlaps(#[case] left: &str, #[case] right: &str, #[case] expected: bool) {
        assert_eq!(Path::new(left).overlaps(Path::new(right)), expected);
    }

    #[test]
    fn test_relative_path_becomes_absolute() {
        let display = Path::new("does/not/exist.txt").best_effort_path_display();
        assert!(Path::new(&display).is_absolute());
        assert!(display.ends_with("does/not/exist.txt"));
    }
}
