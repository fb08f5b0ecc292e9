//! Validated destination directory type.

use crate::ArchiveError;
use crate::Result;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// A validated destination directory for archive extraction.
///
/// This type represents a directory that has been validated to:
/// - Exist on the filesystem
/// - Be a directory (not a file)
/// - Be represented as an absolute canonical path
///
/// Every extracted entry is checked against this canonical root, so a
/// `DestDir` reached through a symlink still confines entries to the real
/// directory.
///
/// # Examples
///
/// ```no_run
/// use zipkit_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/extraction")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` after validating the path.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::DestinationUnwritable` if the path does not
    /// exist, is not a directory, or cannot be canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let canonical = path
            .canonicalize()
            .map_err(|source| ArchiveError::DestinationUnwritable {
                path: path.clone(),
                source,
            })?;

        if !canonical.is_dir() {
            return Err(ArchiveError::DestinationUnwritable {
                path,
                source: io::Error::new(io::ErrorKind::InvalidInput, "path is not a directory"),
            });
        }

        Ok(Self(canonical))
    }

    /// Creates the directory (and missing parents) if absent, then validates
    /// it like [`DestDir::new`].
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::DestinationUnwritable` if the directory cannot
    /// be created or validated.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path).map_err(|source| ArchiveError::DestinationUnwritable {
            path: path.clone(),
            source,
        })?;
        Self::new(path)
    }

    /// Returns the canonical path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for DestDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
