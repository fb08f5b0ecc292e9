//! High-level public API for archive creation and extraction.
//!
//! These functions run on a default [`Engine`]. Build an `Engine` with an
//! [`EngineConfig`](crate::EngineConfig) to change compression, symlink or
//! permission handling.

use std::path::Path;

use crate::Engine;
use crate::EngineError;
use crate::ExtractionReport;
use crate::creation::CreationReport;

/// Version of the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates a ZIP archive from a file or directory.
///
/// A non-empty `password` encrypts every file entry with AES-256; `None` or
/// an empty password writes plain DEFLATE entries.
///
/// # Errors
///
/// Returns an error if:
/// - Either path is empty
/// - The source does not exist or cannot be read
/// - The destination cannot be written
///
/// # Examples
///
/// ```no_run
/// use zipkit_core::create_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = create_archive("src", "out/src.zip", None)?;
/// println!("Created archive with {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn create_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    password: Option<&str>,
) -> Result<CreationReport, EngineError> {
    Engine::default().create_archive(source, destination, password)
}

/// Extracts a ZIP archive into a directory.
///
/// # Errors
///
/// Returns an error if:
/// - Either path is empty
/// - The archive does not exist or is malformed
/// - An entry would be written outside `destination`
/// - An encrypted entry cannot be decrypted with `password`
/// - I/O operations fail
///
/// # Examples
///
/// ```no_run
/// use zipkit_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive("archive.zip", "/tmp/output", Some("secret"))?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    password: Option<&str>,
) -> Result<ExtractionReport, EngineError> {
    Engine::default().extract_archive(source, destination, password)
}

/// Returns the engine version string.
///
/// ```
/// assert!(!zipkit_core::version().is_empty());
/// ```
#[must_use]
pub const fn version() -> &'static str {
    VERSION
}
