//! Zip command implementation.

use crate::cli::ZipArgs;
use crate::error::add_engine_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use zipkit_core::CreationConfig;
use zipkit_core::Engine;
use zipkit_core::EngineConfig;
use zipkit_core::NoopProgress;

pub fn execute(args: &ZipArgs, formatter: &dyn OutputFormatter, show_progress: bool) -> Result<()> {
    let engine = Engine::new(EngineConfig::default().with_creation(creation_config(args)));
    let password = args.password.as_deref();

    let report = if show_progress {
        let mut progress = CliProgress::new("Compressing");
        engine.create_archive_with_progress(
            &args.source,
            &args.destination,
            password,
            &mut progress,
        )
    } else {
        engine.create_archive_with_progress(
            &args.source,
            &args.destination,
            password,
            &mut NoopProgress,
        )
    };
    let report = add_engine_context(report, &args.source)?;

    formatter.format_creation_result(&args.destination, &report)
}

fn creation_config(args: &ZipArgs) -> CreationConfig {
    let mut config = CreationConfig::default()
        .with_follow_symlinks(args.follow_symlinks)
        .with_directory_entries(!args.no_directory_entries)
        .with_strict_walk(args.strict);

    if let Some(level) = args.level {
        config = config.with_compression_level(level);
    }

    config
}
