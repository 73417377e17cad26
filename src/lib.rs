//! mast
//!
//! A command-line file downloader with resumable transfers, custom headers
//! and cookies, and progress display.

pub mod download;
pub mod cli;
pub mod error;

pub use error::DownloadError;

pub use download::{
    Downloader, DownloadConfig, DownloadTask, DownloadOutcome,
    DownloadSink, FileSink, FileType, FileCategory,
    ProgressObserver, ProgressSnapshot, ProgressCounter, NoProgress,
};
pub use cli::{CliArgs, Command, DownloadArgs, Config, ProgressTracker};
