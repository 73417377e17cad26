//! CLI arguments module
//!
//! Defines command-line argument parsing using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the downloader
#[derive(Debug, Parser)]
#[command(name = "mast")]
#[command(about = "A fast and reliable file downloader", long_about = None)]
#[command(
    after_help = "Mast downloads files with support for resumable downloads, \
                  custom headers, and cookies."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a file from a URL
    #[command(after_help = "Examples:\n  \
        mast download https://example.com/file.zip -f file.zip -l downloads/\n  \
        mast download https://example.com/file.zip --header \"Authorization: Bearer token\"")]
    Download(DownloadArgs),

    /// Print the version number
    Version,
}

/// Arguments of the `download` subcommand
#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// URL of the file to download
    #[arg(value_name = "URL")]
    pub url: String,

    /// Destination filename (default: filename from URL)
    #[arg(short = 'f', long = "file", value_name = "NAME")]
    pub file: Option<String>,

    /// Location to save the file
    #[arg(short = 'l', long = "location", value_name = "DIR")]
    pub location: Option<PathBuf>,

    /// Cookies to send with the request (format: name=value)
    #[arg(long = "cookie", value_name = "NAME=VALUE", value_delimiter = ',')]
    pub cookies: Vec<String>,

    /// Headers to send with the request (format: name:value)
    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Maximum number of retry attempts
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Enable resumable downloads
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub resume: bool,

    /// Connect and read timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Accept any content type instead of rejecting non-file responses
    #[arg(long)]
    pub any_content_type: bool,

    /// Print the download result as JSON
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Get the log level based on verbosity settings
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        }
    }
}
