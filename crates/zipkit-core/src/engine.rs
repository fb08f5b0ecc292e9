//! The archive engine facade.
//!
//! [`Engine`] validates caller input, prepares destination directories and
//! routes each call to the plain or AES code path based solely on whether a
//! non-empty password was supplied. Every failure is reported as a single
//! [`EngineError`].

use std::fs;
use std::io;
use std::path::Path;

use crate::ArchiveError;
use crate::EngineError;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::Operation;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::CreationConfig;
use crate::creation::CreationReport;
use crate::creation::create_zip;
use crate::extraction::ExtractionConfig;
use crate::extraction::read_archive;
use crate::types::DestDir;
use crate::types::Encryption;

/// Settings applied to every operation run by an [`Engine`].
///
/// The `encryption` fields of both configs are replaced per call from the
/// password argument.
///
/// # Examples
///
/// ```
/// use zipkit_core::EngineConfig;
/// use zipkit_core::creation::CreationConfig;
///
/// let config = EngineConfig::default()
///     .with_creation(CreationConfig::default().with_compression_level(9));
/// assert_eq!(config.creation.compression_level, Some(9));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Settings for archive creation.
    pub creation: CreationConfig,
    /// Settings for archive extraction.
    pub extraction: ExtractionConfig,
}

impl EngineConfig {
    /// Sets the creation settings.
    #[must_use]
    pub fn with_creation(mut self, creation: CreationConfig) -> Self {
        self.creation = creation;
        self
    }

    /// Sets the extraction settings.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }
}

/// ZIP archive engine.
///
/// Operations are synchronous and run to completion on the calling thread.
/// The engine holds no state besides its configuration, so one instance can
/// be shared across threads.
///
/// # Examples
///
/// ```no_run
/// use zipkit_core::Engine;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = Engine::default();
/// engine.create_archive("photos", "backup/photos.zip", Some("secret"))?;
/// engine.extract_archive("backup/photos.zip", "restored", Some("secret"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a ZIP archive at `destination` from the file or directory at
    /// `source`.
    ///
    /// With a non-empty `password` every file entry is encrypted with
    /// AES-256. Missing parent directories of `destination` are created and an
    /// existing file at `destination` is replaced.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] wrapping `InvalidArgument` for empty paths,
    /// `SourceNotFound`, `DestinationUnwritable`, `ReadFailed` or
    /// `WriteFailed`.
    pub fn create_archive(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<&str>,
    ) -> std::result::Result<CreationReport, EngineError> {
        self.create_archive_with_progress(source, destination, password, &mut NoopProgress)
    }

    /// Same as [`Engine::create_archive`], reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// See [`Engine::create_archive`].
    pub fn create_archive_with_progress(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<&str>,
        progress: &mut dyn ProgressCallback,
    ) -> std::result::Result<CreationReport, EngineError> {
        self.try_create(source.as_ref(), destination.as_ref(), password, progress)
            .map_err(|err| fail(Operation::Create, err))
    }

    /// Extracts the ZIP archive at `source` into the directory `destination`.
    ///
    /// The destination directory is created if needed. Encrypted entries
    /// require `password`; plain entries are extracted either way.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] wrapping `InvalidArgument` for empty paths,
    /// `SourceNotFound`, `DestinationUnwritable`, `ZipSlipDetected`,
    /// `WrongPassword`, `DecryptionFailed`, `CorruptArchive`, `ReadFailed` or
    /// `WriteFailed`.
    pub fn extract_archive(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<&str>,
    ) -> std::result::Result<ExtractionReport, EngineError> {
        self.extract_archive_with_progress(source, destination, password, &mut NoopProgress)
    }

    /// Same as [`Engine::extract_archive`], reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// See [`Engine::extract_archive`].
    pub fn extract_archive_with_progress(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<&str>,
        progress: &mut dyn ProgressCallback,
    ) -> std::result::Result<ExtractionReport, EngineError> {
        self.try_extract(source.as_ref(), destination.as_ref(), password, progress)
            .map_err(|err| fail(Operation::Extract, err))
    }

    fn try_create(
        &self,
        source: &Path,
        destination: &Path,
        password: Option<&str>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<CreationReport> {
        validate_paths(source, destination)?;

        if destination.is_dir() {
            return Err(ArchiveError::DestinationUnwritable {
                path: destination.to_path_buf(),
                source: io::Error::other("destination is a directory"),
            });
        }
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ArchiveError::DestinationUnwritable {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let config = self
            .config
            .creation
            .clone()
            .with_encryption(Encryption::from_password(password));

        log::info!(
            "creating {} from {} ({})",
            destination.display(),
            source.display(),
            mode_name(&config.encryption)
        );
        create_zip(source, destination, &config, progress)
    }

    fn try_extract(
        &self,
        source: &Path,
        destination: &Path,
        password: Option<&str>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        validate_paths(source, destination)?;

        if source.is_dir() {
            return Err(ArchiveError::invalid_argument(format!(
                "source is a directory, not an archive: {}",
                source.display()
            )));
        }

        let dest = DestDir::create(destination)?;
        let config = self
            .config
            .extraction
            .clone()
            .with_encryption(Encryption::from_password(password));

        log::info!(
            "extracting {} into {} ({})",
            source.display(),
            dest.as_path().display(),
            mode_name(&config.encryption)
        );
        read_archive(source, &dest, &config, progress)
    }
}

/// Rejects empty paths and a missing source before anything touches the
/// filesystem.
fn validate_paths(source: &Path, destination: &Path) -> Result<()> {
    if source.as_os_str().is_empty() {
        return Err(ArchiveError::invalid_argument("Source path is required"));
    }
    if destination.as_os_str().is_empty() {
        return Err(ArchiveError::invalid_argument(
            "Destination path is required",
        ));
    }

    match source.try_exists() {
        Ok(true) => Ok(()),
        Ok(false) => Err(ArchiveError::SourceNotFound {
            path: source.to_path_buf(),
        }),
        Err(err) => Err(ArchiveError::ReadFailed {
            path: source.to_path_buf(),
            source: err,
        }),
    }
}

fn mode_name(encryption: &Encryption) -> &'static str {
    if encryption.is_encrypted() {
        "AES-256"
    } else {
        "plain"
    }
}

fn fail(operation: Operation, err: ArchiveError) -> EngineError {
    log::debug!("{} failed: {err}", operation.name());
    EngineError::new(operation, err)
}
