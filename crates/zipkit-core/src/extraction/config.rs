//! Configuration for archive extraction operations.

use crate::ArchiveError;
use crate::Result;
use crate::io::DEFAULT_BUFFER_SIZE;
use crate::types::Encryption;

/// Configuration for archive extraction operations.
///
/// # Examples
///
/// ```
/// use zipkit_core::Encryption;
/// use zipkit_core::extraction::ExtractionConfig;
///
/// let config = ExtractionConfig::default()
///     .with_encryption(Encryption::from_password(Some("secret")))
///     .with_preserve_permissions(true);
/// assert!(config.encryption.password().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Password source for encrypted entries.
    ///
    /// Plain entries are read normally whatever this is set to.
    ///
    /// Default: `Encryption::None`.
    pub encryption: Encryption,

    /// Restore Unix permission bits stored in the archive on extracted files.
    ///
    /// Modes are reduced to `rwx` bits. Directory modes are not restored.
    ///
    /// Default: `false`.
    pub preserve_permissions: bool,

    /// Size of the copy buffer in bytes.
    ///
    /// Default: 8 KiB.
    pub buffer_size: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            encryption: Encryption::None,
            preserve_permissions: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ExtractionConfig {
    /// Creates a new `ExtractionConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the password source.
    #[must_use]
    pub fn with_encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }

    /// Sets whether to restore file permissions.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
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
    /// Returns `ArchiveError::InvalidArgument` if the buffer size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(ArchiveError::invalid_argument(
                "buffer size must be greater than zero",
            ));
        }
        Ok(())
    }
}
