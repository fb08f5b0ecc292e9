//! Configuration for archive creation operations.

use crate::ArchiveError;
use crate::Result;
use crate::io::DEFAULT_BUFFER_SIZE;
use crate::types::Encryption;

/// Default DEFLATE level ("normal").
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Configuration for archive creation operations.
///
/// # Examples
///
/// ```
/// use zipkit_core::creation::CreationConfig;
/// use zipkit_core::types::Encryption;
///
/// // Plain DEFLATE at the normal level
/// let config = CreationConfig::default();
///
/// // Encrypted, maximum compression
/// let custom = CreationConfig::default()
///     .with_encryption(Encryption::from_password(Some("secret")))
///     .with_compression_level(9);
/// assert!(custom.encryption.is_encrypted());
/// ```
#[derive(Debug, Clone)]
pub struct CreationConfig {
    /// Entry encryption. `Encryption::None` writes plain DEFLATE entries.
    ///
    /// Default: `Encryption::None`.
    pub encryption: Encryption,

    /// DEFLATE level (0-9). `0` stores entries without compression.
    ///
    /// Default: `Some(6)`. `None` uses the `zip` crate default.
    pub compression_level: Option<u8>,

    /// Archive the targets of symlinks instead of skipping the links.
    ///
    /// Default: `false` (symlinks are skipped with a warning).
    pub follow_symlinks: bool,

    /// Emit explicit entries (`name/`) for directories.
    ///
    /// Default: `true`. Without them empty directories are lost.
    pub include_directory_entries: bool,

    /// Store Unix permission bits of source files.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,

    /// Fail instead of skipping unreadable subdirectories and dangling links.
    ///
    /// Default: `false`.
    pub strict_walk: bool,

    /// Size of the copy buffer in bytes.
    ///
    /// Default: 8 KiB.
    pub buffer_size: usize,
}

impl Default for CreationConfig {
    fn default() -> Self {
        Self {
            encryption: Encryption::None,
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
            follow_symlinks: false,
            include_directory_entries: true,
            preserve_permissions: true,
            strict_walk: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl CreationConfig {
    /// Creates a new `CreationConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry encryption.
    #[must_use]
    pub fn with_encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }

    /// Sets the compression level.
    ///
    /// # Panics
    ///
    /// Panics if the compression level is not in the range 0-9.
    /// Use `validate()` for non-panicking validation.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!(level <= 9, "compression level must be 0-9");
        self.compression_level = Some(level);
        self
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Sets whether directory entries are written.
    #[must_use]
    pub fn with_directory_entries(mut self, include: bool) -> Self {
        self.include_directory_entries = include;
        self
    }

    /// Sets whether to preserve permissions.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets whether walk problems are fatal.
    #[must_use]
    pub fn with_strict_walk(mut self, strict: bool) -> Self {
        self.strict_walk = strict;
        self
    }

    /// Sets the copy buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::InvalidArgument` if the compression level is
    /// above 9 or the buffer size is zero.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && level > 9
        {
            return Err(ArchiveError::invalid_argument(format!(
                "compression level must be 0-9, got {level}"
            )));
        }
        if self.buffer_size == 0 {
            return Err(ArchiveError::invalid_argument(
                "buffer size must be greater than zero",
            ));
        }
        Ok(())
    }
}
