//! Version command implementation.

use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(formatter: &dyn OutputFormatter) -> Result<()> {
    formatter.format_version(zipkit_core::version())
}
