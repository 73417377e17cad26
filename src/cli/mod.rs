//! CLI module
//!
//! Command-line interface for the downloader.

pub mod args;
pub mod config;
pub mod progress;

pub use args::{CliArgs, Command, DownloadArgs};
pub use config::Config;
pub use progress::{ProgressTracker, format_bytes, format_duration, format_speed};
