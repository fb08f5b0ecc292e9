//! Path containment checks against zip slip.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;
use crate::types::DestDir;

/// Returns `true` if `candidate`, resolved against `root`, stays inside
/// `root`.
///
/// Both paths are canonicalized: symlinks, `.` and `..` are resolved before
/// comparing. Components of the candidate that do not exist yet are resolved
/// lexically on top of the deepest existing ancestor. The comparison is done
/// component by component, so `/dest-evil` is not inside `/dest`.
///
/// Absolute candidates, candidates with a drive prefix and candidates
/// containing NUL bytes are never contained. If `root` cannot be
/// canonicalized the answer is `false`.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use zipkit_core::security::is_contained;
///
/// let root = Path::new("/tmp/dest");
/// assert!(is_contained(root, Path::new("a/b.txt")));
/// assert!(!is_contained(root, Path::new("../../evil.txt")));
/// assert!(!is_contained(root, Path::new("../dest-evil/x")));
/// ```
#[must_use]
pub fn is_contained(root: &Path, candidate: &Path) -> bool {
    let Ok(root) = root.canonicalize() else {
        return false;
    };
    resolve_within(&root, candidate).is_some()
}

/// Per-extraction guard bound to one canonical destination root.
///
/// # Examples
///
/// ```no_run
/// use zipkit_core::security::PathGuard;
/// use zipkit_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = PathGuard::new(DestDir::create("/tmp/out")?);
/// let target = guard.guard("docs/readme.txt")?;
/// assert!(target.starts_with(guard.root()));
///
/// assert!(guard.guard("../../etc/passwd").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: DestDir,
}

impl PathGuard {
    /// Creates a guard for the given destination.
    #[must_use]
    pub fn new(root: DestDir) -> Self {
        Self { root }
    }

    /// Returns the canonical destination root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns `true` if `candidate` stays inside the root.
    #[must_use]
    pub fn is_contained(&self, candidate: &Path) -> bool {
        resolve_within(self.root.as_path(), candidate).is_some()
    }

    /// Validates an archive entry name and returns the path to write it to.
    ///
    /// The returned path is the resolved location inside the root.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::ZipSlipDetected` if the entry escapes the root.
    pub fn guard(&self, entry_name: &str) -> Result<PathBuf> {
        resolve_within(self.root.as_path(), Path::new(entry_name)).ok_or_else(|| {
            log::warn!("rejecting entry outside of destination: {entry_name:?}");
            ArchiveError::ZipSlipDetected {
                entry: entry_name.to_string(),
            }
        })
    }
}

/// Resolves `candidate` under the canonical `root`, or `None` if it escapes.
fn resolve_within(root: &Path, candidate: &Path) -> Option<PathBuf> {
    if candidate.as_os_str().as_encoded_bytes().contains(&0) {
        return None;
    }

    if candidate
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
    {
        return None;
    }

    let resolved = resolve_lenient(&root.join(candidate))?;
    resolved.starts_with(root).then_some(resolved)
}

/// Canonicalizes the longest existing prefix of `path` and applies the
/// remaining components lexically.
fn resolve_lenient(path: &Path) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = path.components().collect();

    for split in (1..=components.len()).rev() {
        let existing: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = existing.canonicalize() else {
            continue;
        };

        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        return Some(resolved);
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_guard() -> (TempDir, PathGuard) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        (temp, PathGuard::new(dest))
    }

    #[test]
    fn test_plain_relative_path_is_contained() {
        let (_temp, guard) = create_test_guard();
        assert!(guard.is_contained(Path::new("foo/bar.txt")));
        assert!(guard.is_contained(Path::new("foo/bar/baz/file.txt")));
    }

    #[test]
    fn test_current_dir_segments_are_contained() {
        let (_temp, guard) = create_test_guard();
        assert!(guard.is_contained(Path::new("./foo/bar.txt")));
        assert!(guard.is_contained(Path::new(".")));
    }

    #[test]
    fn test_root_itself_is_contained() {
        let (_temp, guard) = create_test_guard();
        assert!(guard.is_contained(Path::new("foo/..")));
    }

    #[test]
    fn test_parent_traversal_rejected() {
        let (_temp, guard) = create_test_guard();
        assert!(!guard.is_contained(Path::new("../evil.txt")));
        assert!(!guard.is_contained(Path::new("../../evil.txt")));
        assert!(!guard.is_contained(Path::new("foo/../../evil.txt")));
        assert!(!guard.is_contained(Path::new("missing/../../evil.txt")));
    }

    #[test]
    fn test_inner_parent_segments_allowed() {
        let (temp, guard) = create_test_guard();
        fs::create_dir(temp.path().join("a")).unwrap();

        let target = guard.guard("a/../b.txt").unwrap();
        assert_eq!(target, guard.root().join("b.txt"));
    }

    #[test]
    fn test_absolute_path_rejected() {
        let (temp, guard) = create_test_guard();
        assert!(!guard.is_contained(Path::new("/etc/passwd")));

        // Even when the absolute path points inside the root.
        let inside = temp.path().canonicalize().unwrap().join("x.txt");
        assert!(!guard.is_contained(&inside));
    }

    #[test]
    fn test_sibling_prefix_rejected() {
        let parent = TempDir::new().unwrap();
        let dest_path = parent.path().join("dest");
        let evil_path = parent.path().join("dest-evil");
        fs::create_dir(&dest_path).unwrap();
        fs::create_dir(&evil_path).unwrap();

        assert!(!is_contained(&dest_path, Path::new("../dest-evil/payload")));
        assert!(is_contained(&dest_path, Path::new("payload")));
    }

    #[test]
    fn test_null_byte_rejected() {
        let (_temp, guard) = create_test_guard();
        assert!(!guard.is_contained(Path::new("foo\0bar")));
    }

    #[test]
    fn test_missing_root_is_never_contained() {
        assert!(!is_contained(
            Path::new("/nonexistent/root/for/zipkit"),
            Path::new("file.txt")
        ));
    }

    #[test]
    fn test_guard_returns_zip_slip_error() {
        let (_temp, guard) = create_test_guard();
        let err = guard.guard("../../evil.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZipSlipDetected);
        assert!(err.to_string().contains("../../evil.txt"));
    }

    #[test]
    fn test_guard_returns_path_under_root() {
        let (_temp, guard) = create_test_guard();
        let target = guard.guard("dir/file.txt").unwrap();
        assert_eq!(target, guard.root().join("dir/file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let (temp, guard) = create_test_guard();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("escape")).unwrap();

        assert!(!guard.is_contained(Path::new("escape/payload.txt")));
        assert!(guard.guard("escape/payload.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_allowed() {
        let (temp, guard) = create_test_guard();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();

        let target = guard.guard("alias/file.txt").unwrap();
        assert_eq!(target, guard.root().join("real/file.txt"));
    }
}
