//! Archive creation.
//!
//! [`TreeWalker`] enumerates a source file or directory and
//! [`create_zip`] writes the resulting entries into a ZIP container, plain or
//! AES encrypted depending on [`CreationConfig::encryption`].

pub mod config;
pub mod report;
pub mod walker;
pub mod zip;

// Re-exports for public API
pub use config::CreationConfig;
pub use report::CreationReport;
pub use walker::CollectedEntries;
pub use walker::TreeWalker;
pub use walker::Walk;
pub use walker::collect_entries;
pub use self::zip::create_zip;
pub use self::zip::write_archive;
