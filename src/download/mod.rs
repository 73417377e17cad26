//! Download module
//!
//! HTTP transfer, resume, sinks and progress reporting.

pub mod task;
pub mod downloader;
pub mod sink;
pub mod progress;
pub mod filetype;

pub use task::{DownloadConfig, DownloadTask};
pub use downloader::{Downloader, DownloadOutcome, ContentRange, is_accepted_content_type};
pub use sink::{DownloadSink, FileSink};
pub use progress::{ProgressObserver, ProgressSnapshot, ProgressCounter, NoProgress};
pub use filetype::{FileType, FileCategory};
