//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

/// Environment variable consulted when `--password` is not given.
pub const PASSWORD_ENV: &str = "ZIPKIT_PASSWORD";

#[derive(Parser)]
#[command(name = "zipkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a file or directory into a ZIP archive
    Zip(ZipArgs),
    /// Extract a ZIP archive into a directory
    Unzip(UnzipArgs),
    /// Print the engine version
    Version,
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ZipArgs {
    /// File or directory to archive
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Path of the archive to write
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Encrypt entries with AES-256 using this password
    #[arg(short, long, env = PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,

    /// Compression level (0 stores entries uncompressed)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub level: Option<u8>,

    /// Archive the targets of symbolic links instead of skipping them
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Do not write entries for directories
    #[arg(long)]
    pub no_directory_entries: bool,

    /// Fail on unreadable paths instead of skipping them
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args)]
pub struct UnzipArgs {
    /// Path to the archive file
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output directory (created if missing)
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Password for encrypted entries
    #[arg(short, long, env = PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,

    /// Preserve file permissions from archive
    #[arg(long)]
    pub preserve_permissions: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

impl Commands {
    /// Operation name reported in JSON output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Zip(_) => "zip",
            Self::Unzip(_) => "unzip",
            Self::Version => "version",
            Self::Completion(_) => "completion",
        }
    }
}

impl Cli {
    /// Maps `-v` occurrences to a log level filter.
    ///
    /// Warnings are shown by default so skipped paths stay visible.
    pub const fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
