//! Archive extraction.

pub mod config;
pub mod zip;

pub use config::ExtractionConfig;
pub use self::zip::read_archive;
