//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use crate::error::error_code;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use zipkit_core::CreationReport;
use zipkit_core::ExtractionReport;

pub struct JsonFormatter;

#[derive(Serialize)]
struct CreationOutput {
    output_path: String,
    files_added: usize,
    directories_added: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    compression_percentage: f64,
    encrypted: bool,
    files_skipped: usize,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl CreationOutput {
    fn new(output_path: &Path, report: &CreationReport) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            encrypted: report.encrypted,
            files_skipped: report.files_skipped,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Serialize)]
struct ExtractionOutput {
    output_dir: String,
    files_extracted: usize,
    directories_created: usize,
    entries_decrypted: usize,
    entries_skipped: usize,
    bytes_written: u64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl ExtractionOutput {
    fn new(output_dir: &Path, report: &ExtractionReport) -> Self {
        Self {
            output_dir: output_dir.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            entries_decrypted: report.entries_decrypted,
            entries_skipped: report.entries_skipped,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        let output = JsonOutput::success("zip", CreationOutput::new(output_path, report));
        Self::output(&output)
    }

    fn format_extraction_result(
        &self,
        output_dir: &Path,
        report: &ExtractionReport,
    ) -> Result<()> {
        let output = JsonOutput::success("unzip", ExtractionOutput::new(output_dir, report));
        Self::output(&output)
    }

    fn format_version(&self, version: &str) -> Result<()> {
        #[derive(Serialize)]
        struct VersionData<'a> {
            version: &'a str,
        }

        Self::output(&JsonOutput::success("version", VersionData { version }))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, error.to_string(), error_code(error));
        let _ = Self::output(&output);
    }
}
