//! Unzip command implementation.

use crate::cli::UnzipArgs;
use crate::error::add_engine_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use zipkit_core::Engine;
use zipkit_core::EngineConfig;
use zipkit_core::ExtractionConfig;
use zipkit_core::NoopProgress;

pub fn execute(
    args: &UnzipArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let config = ExtractionConfig::default().with_preserve_permissions(args.preserve_permissions);
    let engine = Engine::new(EngineConfig::default().with_extraction(config));
    let password = args.password.as_deref();

    // Use progress bar if TTY is detected (not quiet, not JSON, is terminal)
    let report = if show_progress {
        let mut progress = CliProgress::new("Extracting");
        engine.extract_archive_with_progress(
            &args.source,
            &args.destination,
            password,
            &mut progress,
        )
    } else {
        engine.extract_archive_with_progress(
            &args.source,
            &args.destination,
            password,
            &mut NoopProgress,
        )
    };
    let report = add_engine_context(report, &args.source)?;

    formatter.format_extraction_result(&args.destination, &report)
}
