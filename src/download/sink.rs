//! Download sink abstraction
//!
//! The downloader writes the response body through a `DownloadSink` without
//! knowing where the bytes end up. `FileSink` is the on-disk implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error};

use crate::error::DownloadError;

/// Destination for streamed response bytes
#[async_trait]
pub trait DownloadSink: Send {
    /// Write one chunk of the body, in order
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), DownloadError>;

    /// Flush everything and return the bytes written through this sink
    async fn finish(&mut self) -> Result<u64, DownloadError>;
}

/// Buffered file sink
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl FileSink {
    /// Create or truncate `path`
    pub async fn create(path: &Path, capacity: usize) -> Result<Self, DownloadError> {
        ensure_parent(path).await?;
        debug!("Creating destination file: {}", path.display());
        let file = File::create(path).await.map_err(|e| {
            error!("Failed to create destination file '{}': {}", path.display(), e);
            DownloadError::storage_error_full(
                "Failed to create destination file",
                path.display().to_string(),
                e.to_string(),
            )
        })?;
        Ok(Self::from_file(path, file, capacity))
    }

    /// Open `path` for appending, creating it if missing
    pub async fn append(path: &Path, capacity: usize) -> Result<Self, DownloadError> {
        ensure_parent(path).await?;
        debug!("Opening destination file for append: {}", path.display());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| {
                error!("Failed to open destination file '{}': {}", path.display(), e);
                DownloadError::storage_error_full(
                    "Failed to open file",
                    path.display().to_string(),
                    e.to_string(),
                )
            })?;
        Ok(Self::from_file(path, file, capacity))
    }

    fn from_file(path: &Path, file: File, capacity: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            writer: BufWriter::with_capacity(capacity.max(1), file),
            written: 0,
        }
    }
}

#[async_trait]
impl DownloadSink for FileSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), DownloadError> {
        self.writer.write_all(&chunk).await.map_err(|e| {
            DownloadError::storage_error_full(
                "Failed to write file",
                self.path.display().to_string(),
                e.to_string(),
            )
        })?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn finish(&mut self) -> Result<u64, DownloadError> {
        self.writer.flush().await.map_err(|e| {
            DownloadError::storage_error_full(
                "Failed to flush file",
                self.path.display().to_string(),
                e.to_string(),
            )
        })?;
        Ok(self.written)
    }
}

/// Create the parent directory of `path` if it is missing
async fn ensure_parent(path: &Path) -> Result<(), DownloadError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await.map_err(|e| {
                error!("Failed to create destination directory '{}': {}", parent.display(), e);
                DownloadError::storage_error_full(
                    "Failed to create destination directory",
                    parent.display().to_string(),
                    e.to_string(),
                )
            })
        }
        _ => Ok(()),
    }
}
