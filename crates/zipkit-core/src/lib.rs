//! ZIP archive engine with AES encryption and zip-slip protection.
//!
//! `zipkit-core` creates ZIP archives from files or directory trees and
//! extracts them again. A non-empty password switches both directions to
//! WinZip AES-256 entries. Extraction checks every entry name against the
//! destination root before writing and aborts on the first entry that would
//! land outside it.
//!
//! # Examples
//!
//! ```no_run
//! use zipkit_core::create_archive;
//! use zipkit_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = create_archive("project", "/backups/project.zip", Some("secret"))?;
//! println!("Archived {} files", report.files_added);
//!
//! let report = extract_archive("/backups/project.zip", "/restore", Some("secret"))?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod creation;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod io;
pub mod report;
pub mod security;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main API types
pub use api::create_archive;
pub use api::extract_archive;
pub use api::version;
pub use creation::CreationConfig;
pub use creation::CreationReport;
pub use engine::Engine;
pub use engine::EngineConfig;
pub use error::ArchiveError;
pub use error::EngineError;
pub use error::ErrorKind;
pub use error::Operation;
pub use error::Result;
pub use extraction::ExtractionConfig;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

// Re-export types module for easier access
pub use types::ArchiveEntry;
pub use types::DestDir;
pub use types::Encryption;
pub use types::EntryKind;
pub use types::Password;
