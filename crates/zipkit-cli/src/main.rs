//! zipkit CLI - Command-line utility for creating and extracting ZIP
//! archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let formatter = output::create_formatter(cli.json, cli.verbose > 0, cli.quiet);
    let show_progress = !cli.json && !cli.quiet && progress::CliProgress::should_show();

    let result = match &cli.command {
        cli::Commands::Zip(args) => commands::zip::execute(args, &*formatter, show_progress),
        cli::Commands::Unzip(args) => commands::unzip::execute(args, &*formatter, show_progress),
        cli::Commands::Version => commands::version::execute(&*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(cli.command.name(), &err);
            ExitCode::FAILURE
        }
    }
}
