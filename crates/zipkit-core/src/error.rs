//! Error types for archive creation and extraction.

use std::io;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Coarse classification of an [`ArchiveError`].
///
/// Hosts that only need to branch on the failure category (for example to
/// map it onto their own error codes) can match on this instead of the full
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An argument was empty or malformed.
    InvalidArgument,
    /// The source file or directory does not exist.
    SourceNotFound,
    /// The destination could not be created or written.
    DestinationUnwritable,
    /// An archive entry resolved outside the destination directory.
    ZipSlipDetected,
    /// The password is missing or does not match.
    WrongPassword,
    /// Encrypted data failed authentication while being decrypted.
    DecryptionFailed,
    /// The archive structure is malformed or unsupported.
    CorruptArchive,
    /// Writing output failed.
    WriteFailed,
    /// Reading input failed.
    ReadFailed,
}

impl ErrorKind {
    /// Returns a stable, upper-case identifier for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipkit_core::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::ZipSlipDetected.code(), "ZIP_SLIP_DETECTED");
    /// ```
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::SourceNotFound => "SOURCE_NOT_FOUND",
            Self::DestinationUnwritable => "DESTINATION_UNWRITABLE",
            Self::ZipSlipDetected => "ZIP_SLIP_DETECTED",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::DecryptionFailed => "DECRYPTION_FAILED",
            Self::CorruptArchive => "CORRUPT_ARCHIVE",
            Self::WriteFailed => "WRITE_FAILED",
            Self::ReadFailed => "READ_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors that can occur while creating or extracting an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// A required argument was empty or malformed.
    #[error("{reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// The source path does not exist.
    #[error("source path does not exist: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The destination could not be created or opened for writing.
    #[error("destination is not writable: {path}: {source}")]
    DestinationUnwritable {
        /// The destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An entry would be written outside the destination directory.
    #[error("entry is outside of the target directory: {entry}")]
    ZipSlipDetected {
        /// The offending entry name, as stored in the archive.
        entry: String,
    },

    /// The entry is encrypted and the password is missing or wrong.
    #[error("wrong or missing password for encrypted entry: {entry}")]
    WrongPassword {
        /// The encrypted entry name.
        entry: String,
    },

    /// Decrypted data failed its integrity check.
    #[error("failed to decrypt entry {entry}: {source}")]
    DecryptionFailed {
        /// The encrypted entry name.
        entry: String,
        /// Underlying I/O error reported by the decrypting reader.
        #[source]
        source: io::Error,
    },

    /// The archive is malformed or uses an unsupported feature.
    #[error("corrupt archive: {reason}")]
    CorruptArchive {
        /// Description of the problem.
        reason: String,
    },

    /// Writing to an output file failed.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        /// The file being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading an input file failed.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    /// Returns the classification of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipkit_core::ArchiveError;
    /// use zipkit_core::ErrorKind;
    ///
    /// let err = ArchiveError::ZipSlipDetected {
    ///     entry: "../../evil.txt".to_string(),
    /// };
    /// assert_eq!(err.kind(), ErrorKind::ZipSlipDetected);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::DestinationUnwritable { .. } => ErrorKind::DestinationUnwritable,
            Self::ZipSlipDetected { .. } => ErrorKind::ZipSlipDetected,
            Self::WrongPassword { .. } => ErrorKind::WrongPassword,
            Self::DecryptionFailed { .. } => ErrorKind::DecryptionFailed,
            Self::CorruptArchive { .. } => ErrorKind::CorruptArchive,
            Self::WriteFailed { .. } => ErrorKind::WriteFailed,
            Self::ReadFailed { .. } => ErrorKind::ReadFailed,
        }
    }

    /// Returns `true` if this error indicates a hostile or tampered archive.
    ///
    /// ```
    /// use zipkit_core::ArchiveError;
    ///
    /// let err = ArchiveError::ZipSlipDetected {
    ///     entry: "../etc/passwd".to_string(),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ArchiveError::CorruptArchive {
    ///     reason: "bad header".to_string(),
    /// };
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::ZipSlipDetected { .. } | Self::DecryptionFailed { .. }
        )
    }

    /// Returns `true` if supplying a (different) password could fix this error.
    #[must_use]
    pub const fn is_password_error(&self) -> bool {
        matches!(
            self,
            Self::WrongPassword { .. } | Self::DecryptionFailed { .. }
        )
    }

    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptArchive {
            reason: reason.into(),
        }
    }

    /// Maps a `zip` error raised while reading `archive`.
    pub(crate) fn from_zip_read(err: ZipError, archive: &Path) -> Self {
        match err {
            ZipError::Io(source) if source.kind() == io::ErrorKind::UnexpectedEof => {
                Self::corrupt(format!("unexpected end of archive: {source}"))
            }
            ZipError::Io(source) => Self::ReadFailed {
                path: archive.to_path_buf(),
                source,
            },
            ZipError::InvalidArchive(reason) => Self::corrupt(reason.to_string()),
            ZipError::UnsupportedArchive(reason) => {
                Self::corrupt(format!("unsupported archive: {reason}"))
            }
            other => Self::corrupt(other.to_string()),
        }
    }

    /// Maps a `zip` error raised while writing `archive`.
    pub(crate) fn from_zip_write(err: ZipError, archive: &Path) -> Self {
        let source = match err {
            ZipError::Io(source) => source,
            other => io::Error::other(other.to_string()),
        };
        Self::WriteFailed {
            path: archive.to_path_buf(),
            source,
        }
    }
}

/// The facade operation that produced an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Creating an archive.
    Create,
    /// Extracting an archive.
    Extract,
}

impl Operation {
    /// Short lower-case name, used in logs and machine-readable output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "zip",
            Self::Extract => "unzip",
        }
    }

    const fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Failed to create zip archive",
            Self::Extract => "Failed to extract zip archive",
        }
    }
}

/// The single failure outcome returned by the [`Engine`](crate::Engine).
///
/// Carries a human-readable message and keeps the underlying
/// [`ArchiveError`] as its `source()`.
///
/// # Examples
///
/// ```
/// use zipkit_core::ErrorKind;
/// use zipkit_core::create_archive;
///
/// let err = create_archive("", "/tmp/out.zip", None).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
/// assert!(err.to_string().starts_with("Failed to create zip archive"));
/// ```
#[derive(Error, Debug)]
#[error("{}: {source}", operation.failure_message())]
pub struct EngineError {
    operation: Operation,
    #[source]
    source: ArchiveError,
}

impl EngineError {
    pub(crate) const fn new(operation: Operation, source: ArchiveError) -> Self {
        Self { operation, source }
    }

    /// Returns the operation that failed.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the classification of the underlying error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Returns the underlying archive error.
    #[must_use]
    pub const fn archive_error(&self) -> &ArchiveError {
        &self.source
    }

    /// Consumes the wrapper and returns the underlying archive error.
    #[must_use]
    pub fn into_archive_error(self) -> ArchiveError {
        self.source
    }
}
