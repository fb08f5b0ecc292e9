//! Error conversion utilities for CLI.
//!
//! Converts zipkit-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use std::path::Path;
use zipkit_core::EngineError;
use zipkit_core::ErrorKind;

/// Code reported when an error did not come from the engine.
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL";

/// Converts `EngineError` to user-friendly anyhow error with context.
///
/// The context message is complete on its own and is what the formatters
/// print. The engine error stays in the chain, so [`error_code`] can still
/// recover its kind.
pub fn convert_engine_error(err: EngineError, path: &Path) -> anyhow::Error {
    let message = match err.kind() {
        ErrorKind::ZipSlipDetected => format!(
            "Security violation: Archive '{}' contains an entry outside the destination\n\
             HINT: This archive may be malicious. Do not extract from untrusted sources.",
            path.display()
        ),
        ErrorKind::WrongPassword => format!(
            "Wrong or missing password for '{}'\n\
             HINT: Pass --password or set {}.",
            path.display(),
            crate::cli::PASSWORD_ENV
        ),
        ErrorKind::DecryptionFailed => format!(
            "Encrypted data in '{}' failed authentication\n\
             HINT: The password may be wrong or the archive was tampered with.",
            path.display()
        ),
        ErrorKind::CorruptArchive => format!(
            "Invalid archive '{}'\n\
             HINT: The archive may be corrupted, truncated or not a ZIP file.",
            path.display()
        ),
        ErrorKind::SourceNotFound => format!("'{}' does not exist", path.display()),
        ErrorKind::DestinationUnwritable => format!(
            "Cannot write to destination for '{}'\n\
             HINT: Check that the parent directory exists and is writable.",
            path.display()
        ),
        ErrorKind::InvalidArgument | ErrorKind::ReadFailed | ErrorKind::WriteFailed => format!(
            "Error processing '{}': {}",
            path.display(),
            err.archive_error()
        ),
    };

    anyhow::Error::new(err).context(message)
}

/// Adds context to an engine result.
pub fn add_engine_context<T>(result: Result<T, EngineError>, path: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_engine_error(e, path))
}

/// Returns the stable error code carried by `err`.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<EngineError>()
        .map_or(INTERNAL_ERROR_CODE, |e| e.kind().code())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use zipkit_core::extract_archive;

    fn engine_error() -> EngineError {
        extract_archive("", "/tmp/zipkit-unused", None).unwrap_err()
    }

    #[test]
    fn test_convert_keeps_engine_error() {
        let converted = convert_engine_error(engine_error(), Path::new("input.zip"));
        assert!(converted.downcast_ref::<EngineError>().is_some());
        assert_eq!(error_code(&converted), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_convert_message_mentions_path() {
        let converted = convert_engine_error(engine_error(), Path::new("input.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("input.zip"));
        assert!(msg.contains("Failed to extract zip archive"));
    }

    #[test]
    fn test_message_states_cause_once() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let err = zipkit_core::create_archive(&missing, temp.path().join("out.zip"), None)
            .unwrap_err();

        let converted = convert_engine_error(err, &missing);
        let msg = converted.to_string();
        assert_eq!(msg.matches("does not exist").count(), 1);
        assert_eq!(error_code(&converted), "SOURCE_NOT_FOUND");
    }

    #[test]
    fn test_generic_message_keeps_detail() {
        let converted = convert_engine_error(engine_error(), Path::new("input.zip"));
        let msg = converted.to_string();
        assert!(msg.starts_with("Error processing 'input.zip': "));
        assert!(msg.len() > "Error processing 'input.zip': ".len());
    }

    #[test]
    fn test_foreign_error_code() {
        let err = anyhow!("something else");
        assert_eq!(error_code(&err), INTERNAL_ERROR_CODE);
    }
}
