//! Source tree enumeration.
//!
//! Turns a file or directory into the ordered list of entries that will be
//! written to an archive. Traversal is depth-first with children sorted by
//! name, so the same tree always produces the same archive layout.

use crate::ArchiveError;
use crate::Result;
use crate::creation::config::CreationConfig;
use crate::types::ArchiveEntry;
use crate::types::EntryKind;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use walkdir::DirEntry;
use walkdir::WalkDir;

/// Walks a source path according to `CreationConfig`.
///
/// A single file yields one entry named by its base name. A directory yields
/// its own entry (named by its base name) followed by every descendant, with
/// names built by joining path segments with `/`.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use zipkit_core::creation::CreationConfig;
/// use zipkit_core::creation::TreeWalker;
///
/// let config = CreationConfig::default();
/// let walker = TreeWalker::new(Path::new("./project"), &config);
///
/// for entry in walker.walk()? {
///     let entry = entry?;
///     println!("Would add: {}", entry.zip_name());
/// }
/// # Ok::<(), zipkit_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct TreeWalker<'a> {
    source: &'a Path,
    config: &'a CreationConfig,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker for `source`.
    #[must_use]
    pub fn new(source: &'a Path, config: &'a CreationConfig) -> Self {
        Self { source, config }
    }

    /// Starts the walk.
    ///
    /// Entries are produced lazily. Skipped paths are collected in
    /// [`Walk::warnings`].
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if the source does not exist and
    /// `InvalidArgument` if its name cannot be stored in a ZIP archive.
    pub fn walk(&self) -> Result<Walk> {
        if std::fs::symlink_metadata(self.source).is_err() {
            return Err(ArchiveError::SourceNotFound {
                path: self.source.to_path_buf(),
            });
        }

        let base = base_name(self.source)?;
        let inner = WalkDir::new(self.source)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        Ok(Walk {
            inner,
            root: self.source.to_path_buf(),
            base,
            strict: self.config.strict_walk,
            warnings: Vec::new(),
        })
    }
}

/// Lazy iterator over the entries of a source tree.
pub struct Walk {
    inner: walkdir::IntoIter,
    root: PathBuf,
    base: String,
    strict: bool,
    warnings: Vec<String>,
}

impl Walk {
    /// Warnings for paths skipped so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consumes the walk and returns its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    fn skip(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }

    fn entry_name(&self, entry: &DirEntry) -> Result<String> {
        let relative = entry.path().strip_prefix(&self.root).map_err(|_| {
            ArchiveError::invalid_argument(format!(
                "walked path is outside of the source: {}",
                entry.path().display()
            ))
        })?;

        let mut name = self.base.clone();
        for segment in relative.iter() {
            let segment = segment.to_str().ok_or_else(|| {
                ArchiveError::invalid_argument(format!(
                    "file name is not valid UTF-8: {}",
                    entry.path().display()
                ))
            })?;
            name.push('/');
            name.push_str(segment);
        }
        Ok(name)
    }

    /// Converts a walked path into an entry, or `None` if it is skipped.
    fn convert(&mut self, entry: &DirEntry) -> Result<Option<ArchiveEntry>> {
        let is_root = entry.depth() == 0;
        let file_type = entry.file_type();

        // The root is archived even when it is a link; the caller named it.
        if !is_root && file_type.is_symlink() {
            self.skip(format!("Skipped symlink: {}", entry.path().display()));
            return Ok(None);
        }

        let name = self.entry_name(entry)?;

        if file_type.is_dir() {
            return Ok(Some(ArchiveEntry::new(
                name,
                entry.path(),
                EntryKind::Directory,
                0,
            )));
        }

        if !file_type.is_file() {
            self.skip(format!("Skipped special file: {}", entry.path().display()));
            return Ok(None);
        }

        match entry.metadata() {
            Ok(metadata) => Ok(Some(ArchiveEntry::new(
                name,
                entry.path(),
                EntryKind::File,
                metadata.len(),
            ))),
            Err(err) => self.unreadable(err).map(|()| None),
        }
    }

    /// Applies the skip policy to a traversal error.
    fn unreadable(&mut self, err: walkdir::Error) -> Result<()> {
        let path = err
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if err.loop_ancestor().is_some() && !self.strict {
            self.skip(format!("Skipped symlink loop: {}", path.display()));
            return Ok(());
        }

        if err.depth() == 0 || self.strict {
            return Err(ArchiveError::ReadFailed {
                path,
                source: io::Error::from(err),
            });
        }

        self.skip(format!("Skipped unreadable path: {} ({err})", path.display()));
        Ok(())
    }
}

impl Iterator for Walk {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = match self.inner.next()? {
                Ok(entry) => self.convert(&entry),
                Err(err) => self.unreadable(err).map(|()| None),
            };

            match result {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl std::fmt::Debug for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("root", &self.root)
            .field("base", &self.base)
            .field("warnings", &self.warnings.len())
            .finish_non_exhaustive()
    }
}

/// Entries of a fully walked source, plus the paths that were skipped.
#[derive(Debug, Clone, Default)]
pub struct CollectedEntries {
    /// Entries in archive order.
    pub entries: Vec<ArchiveEntry>,
    /// One message per skipped path.
    pub warnings: Vec<String>,
}

/// Walks `source` to completion.
///
/// Collecting up front gives the writer the total entry count for progress
/// reporting.
///
/// # Errors
///
/// Returns the first error produced by the walk.
pub fn collect_entries(source: &Path, config: &CreationConfig) -> Result<CollectedEntries> {
    let mut walk = TreeWalker::new(source, config).walk()?;
    let mut entries = Vec::new();
    for entry in walk.by_ref() {
        entries.push(entry?);
    }

    Ok(CollectedEntries {
        entries,
        warnings: walk.into_warnings(),
    })
}

/// Name of the top-level archive segment for `source`.
fn base_name(source: &Path) -> Result<String> {
    let name = match source.file_name() {
        Some(name) => name.to_os_string(),
        None => {
            let canonical = source
                .canonicalize()
                .map_err(|source_err| ArchiveError::ReadFailed {
                    path: source.to_path_buf(),
                    source: source_err,
                })?;
            canonical
                .file_name()
                .ok_or_else(|| {
                    ArchiveError::invalid_argument(format!(
                        "cannot determine an archive name for {}",
                        source.display()
                    ))
                })?
                .to_os_string()
        }
    };

    name.into_string().map_err(|name| {
        ArchiveError::invalid_argument(format!(
            "file name is not valid UTF-8: {}",
            Path::new(&name).display()
        ))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[ArchiveEntry]) -> Vec<String> {
        entries.iter().map(ArchiveEntry::zip_name).collect()
    }

    fn sample_tree(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("b.txt"), "bee").unwrap();
        fs::write(root.join("a.txt"), "ay").unwrap();
        fs::write(root.join("sub/c.txt"), "sea").unwrap();
        root
    }

    #[test]
    fn test_walk_single_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();

        let config = CreationConfig::default();
        let collected = collect_entries(&file, &config).unwrap();

        assert_eq!(collected.entries.len(), 1);
        let entry = &collected.entries[0];
        assert_eq!(entry.name, "notes.txt");
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 5);
    }

    #[test]
    fn test_walk_directory_sorted_depth_first() {
        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);

        let config = CreationConfig::default();
        let collected = collect_entries(&root, &config).unwrap();

        assert_eq!(
            names(&collected.entries),
            vec![
                "root/",
                "root/a.txt",
                "root/b.txt",
                "root/sub/",
                "root/sub/c.txt",
            ]
        );
        assert!(collected.warnings.is_empty());
    }

    #[test]
    fn test_walk_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);
        let config = CreationConfig::default();

        let first = collect_entries(&root, &config).unwrap();
        let second = collect_entries(&root, &config).unwrap();
        assert_eq!(first.entries, second.entries);
    }

    #[test]
    fn test_walk_trailing_dot_uses_directory_name() {
        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);

        let config = CreationConfig::default();
        let collected = collect_entries(&root.join("."), &config).unwrap();
        assert_eq!(collected.entries[0].name, "root");
    }

    #[test]
    fn test_walk_names_never_escape() {
        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);

        let config = CreationConfig::default();
        let collected = collect_entries(&root.join("sub/.."), &config).unwrap();

        for entry in &collected.entries {
            assert!(!entry.name.starts_with('/'));
            assert!(!entry.name.split('/').any(|s| s == ".."));
        }
    }

    #[test]
    fn test_walk_missing_source() {
        let temp = TempDir::new().unwrap();
        let config = CreationConfig::default();
        let err = TreeWalker::new(&temp.path().join("missing"), &config)
            .walk()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_symlinks_by_default() {
        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("link.txt")).unwrap();

        let config = CreationConfig::default();
        let collected = collect_entries(&root, &config).unwrap();

        assert!(!names(&collected.entries).contains(&"root/link.txt".to_string()));
        assert_eq!(collected.warnings.len(), 1);
        assert!(collected.warnings[0].contains("Skipped symlink"));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_follows_symlinks_when_enabled() {
        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("link.txt")).unwrap();

        let config = CreationConfig::default().with_follow_symlinks(true);
        let collected = collect_entries(&root, &config).unwrap();

        let link = collected
            .entries
            .iter()
            .find(|e| e.name == "root/link.txt")
            .unwrap();
        assert_eq!(link.kind, EntryKind::File);
        assert_eq!(link.size, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_symlink_loop_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);
        std::os::unix::fs::symlink(&root, root.join("sub/back")).unwrap();

        let config = CreationConfig::default().with_follow_symlinks(true);
        let collected = collect_entries(&root, &config).unwrap();

        assert!(collected.warnings.iter().any(|w| w.contains("loop")));
        assert!(
            !names(&collected.entries)
                .iter()
                .any(|n| n.starts_with("root/sub/back/"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_unreadable_subdirectory_policy() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let root = sample_tree(&temp);
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("secret.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let lenient = collect_entries(&root, &CreationConfig::default());
        let strict = collect_entries(&root, &CreationConfig::default().with_strict_walk(true));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let lenient = lenient.unwrap();
        assert!(
            lenient
                .warnings
                .iter()
                .any(|w| w.contains("Skipped unreadable"))
        );
        assert!(names(&lenient.entries).contains(&"root/sub/c.txt".to_string()));

        assert_eq!(strict.unwrap_err().kind(), ErrorKind::ReadFailed);
    }
}
