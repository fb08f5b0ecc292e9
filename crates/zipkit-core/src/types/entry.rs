//! Archive entry types.

use std::path::Path;
use std::path::PathBuf;

/// Kind of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file with content.
    File,
    /// Directory marker without content.
    Directory,
}

impl EntryKind {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// An entry to be written into an archive.
///
/// `name` is the relative, `/`-separated name stored in the archive. It never
/// starts with `/`, never carries a drive prefix, and never contains a `..`
/// segment. `path` is the filesystem location the content is read from.
///
/// # Examples
///
/// ```
/// use zipkit_core::types::ArchiveEntry;
/// use zipkit_core::types::EntryKind;
///
/// let entry = ArchiveEntry::new("root/sub", "/data/root/sub", EntryKind::Directory, 0);
/// assert_eq!(entry.zip_name(), "root/sub/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Relative archive name using `/` separators.
    pub name: String,

    /// Absolute (or caller-relative) filesystem path of the source.
    pub path: PathBuf,

    /// File or directory.
    pub kind: EntryKind,

    /// Size in bytes at walk time (0 for directories).
    pub size: u64,
}

impl ArchiveEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        kind: EntryKind,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            size,
        }
    }

    /// Returns the name as stored in the ZIP container.
    ///
    /// Directory entries get a trailing `/`, which is how ZIP readers
    /// recognize them.
    #[must_use]
    pub fn zip_name(&self) -> String {
        match self.kind {
            EntryKind::File => self.name.clone(),
            EntryKind::Directory => format!("{}/", self.name),
        }
    }

    /// Returns the source path.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.path
    }
}
