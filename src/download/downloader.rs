//! HTTP downloader
//!
//! Issues one GET per task, either for the whole file or, when a partial
//! file exists and resume is enabled, for the remaining range. The body is
//! streamed to a `DownloadSink` while a `ProgressObserver` is kept informed.

use std::path::PathBuf;
use std::time::Instant;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_RANGE,
    CONTENT_TYPE, COOKIE, RANGE, USER_AGENT,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::download::filetype::FileType;
use crate::download::progress::ProgressObserver;
use crate::download::sink::{DownloadSink, FileSink};
use crate::download::task::{DownloadConfig, DownloadTask};
use crate::error::DownloadError;

/// Content types accepted as a downloadable file
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &[
    "text/",
    "application/pdf",
    "application/octet-stream",
    "application/x-msdownload",
    "application/x-download",
    "application/zip",
    "application/x-zip",
    "application/x-zip-compressed",
];

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Most bytes read from a rejected response before giving up on it
pub const BODY_PEEK_LIMIT: usize = 64 * 1024;

/// Result of a finished transfer
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    pub url: String,
    pub destination: PathBuf,
    /// Whether this was a ranged continuation of a partial file
    pub resumed: bool,
    /// Bytes already on disk before the transfer
    pub resumed_from: u64,
    /// Bytes written in this session
    pub bytes_written: u64,
    /// Size of the destination after the transfer
    pub file_size: u64,
    /// Final size announced by the server, if any
    pub expected_size: Option<u64>,
    pub file_type: FileType,
    pub elapsed_secs: f64,
}

/// Single-connection HTTP downloader
#[derive(Debug, Clone)]
pub struct Downloader {
    config: DownloadConfig,
    client: Client,
}

impl Downloader {
    /// Create a downloader with its own HTTP client
    pub fn new(config: DownloadConfig) -> Result<Self, DownloadError> {
        let config = config.normalized();
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| {
                error!("Failed to build HTTP client: {}", e);
                DownloadError::config_error(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Settings in effect
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download `task`, resuming a partial file when possible
    pub async fn download(
        &self,
        task: &DownloadTask,
        observer: &mut dyn ProgressObserver,
    ) -> Result<DownloadOutcome, DownloadError> {
        info!("Downloading {} -> {}", task.url, task.destination.display());
        debug!(
            "Retry policy: {} attempts, {:?} delay (not applied to transfers)",
            self.config.max_retries, self.config.retry_delay
        );

        if self.config.resume_enabled && task.can_resume() {
            self.resume_download(task, observer).await
        } else {
            self.start_new_download(task, observer).await
        }
    }

    async fn start_new_download(
        &self,
        task: &DownloadTask,
        observer: &mut dyn ProgressObserver,
    ) -> Result<DownloadOutcome, DownloadError> {
        let started = Instant::now();
        let response = self.send(task, None).await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = read_error_body(response).await;
            error!("Server returned status {} for {}", status, task.url);
            return Err(DownloadError::http_status(status.as_u16(), body));
        }

        let response = self.check_content_type(response).await?;
        let file_type = detect_file_type(&task.url, &response);
        let expected = response.content_length();

        let mut sink = FileSink::create(&task.destination, self.config.chunk_size).await?;
        let written = stream_body(response, &mut sink, observer, expected, 0).await?;

        info!("Downloaded {} bytes to {}", written, task.destination.display());
        Ok(DownloadOutcome {
            url: task.url.clone(),
            destination: task.destination.clone(),
            resumed: false,
            resumed_from: 0,
            bytes_written: written,
            file_size: written,
            expected_size: expected,
            file_type,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }

    async fn resume_download(
        &self,
        task: &DownloadTask,
        observer: &mut dyn ProgressObserver,
    ) -> Result<DownloadOutcome, DownloadError> {
        let started = Instant::now();
        let offset = task.existing_len();
        info!("Resuming {} from byte {}", task.destination.display(), offset);

        let response = self.send(task, Some(offset)).await?;

        match response.status() {
            StatusCode::PARTIAL_CONTENT => {}
            StatusCode::RANGE_NOT_SATISFIABLE => {
                warn!("Range bytes={}- not satisfiable for {}", offset, task.url);
                return Err(DownloadError::RangeNotSatisfiable { offset });
            }
            other => {
                error!("Resume rejected with status {} for {}", other, task.url);
                return Err(DownloadError::resume_unsupported(
                    other.as_u16(),
                    other.canonical_reason().unwrap_or_default(),
                ));
            }
        }

        let content_range = match response.headers().get(CONTENT_RANGE) {
            Some(value) => {
                let raw = value.to_str().unwrap_or_default();
                match ContentRange::parse(raw) {
                    Some(range) => Some(range),
                    None => {
                        error!("Malformed Content-Range {:?} for {}", raw, task.url);
                        return Err(DownloadError::resume_unsupported(
                            206,
                            format!("malformed Content-Range {:?}", raw),
                        ));
                    }
                }
            }
            None => None,
        };
        if let Some(range) = &content_range {
            if range.start != offset {
                error!("Server resumed at byte {} instead of {}", range.start, offset);
                return Err(DownloadError::resume_unsupported(
                    206,
                    format!("server resumed at byte {} instead of {}", range.start, offset),
                ));
            }
        }

        let response = self.check_content_type(response).await?;
        let file_type = detect_file_type(&task.url, &response);
        let expected = content_range
            .and_then(|range| range.total)
            .or_else(|| response.content_length().map(|len| len + offset));

        let mut sink = FileSink::append(&task.destination, self.config.chunk_size).await?;
        let written = stream_body(response, &mut sink, observer, expected, offset).await?;

        info!(
            "Resumed download wrote {} bytes to {} ({} total)",
            written,
            task.destination.display(),
            offset + written
        );
        Ok(DownloadOutcome {
            url: task.url.clone(),
            destination: task.destination.clone(),
            resumed: true,
            resumed_from: offset,
            bytes_written: written,
            file_size: offset + written,
            expected_size: expected,
            file_type,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }

    /// Build and send the GET for `task`, ranged from `offset` if given
    async fn send(
        &self,
        task: &DownloadTask,
        offset: Option<u64>,
    ) -> Result<Response, DownloadError> {
        let request = self.build_request(task, offset)?;
        request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", task.url, e);
            DownloadError::from(e)
        })
    }

    /// Build the GET for `task` with default, custom and cookie headers
    pub fn build_request(
        &self,
        task: &DownloadTask,
        offset: Option<u64>,
    ) -> Result<RequestBuilder, DownloadError> {
        let headers = self.request_headers(task, offset)?;
        Ok(self.client.get(&task.url).headers(headers))
    }

    /// Headers sent for `task`
    pub fn request_headers(
        &self,
        task: &DownloadTask,
        offset: Option<u64>,
    ) -> Result<HeaderMap, DownloadError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        if let Some(offset) = offset {
            headers.insert(RANGE, HeaderValue::from_str(&format!("bytes={}-", offset))?);
        }

        for (name, value) in &task.headers {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            if offset.is_some() && name == RANGE {
                warn!("Ignoring custom Range header {:?} while resuming", value);
                continue;
            }
            headers.insert(name, HeaderValue::from_str(value)?);
        }

        if let Some(cookies) = task.cookie_header() {
            // Cookies given as a raw header are kept in front.
            let cookie = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(existing) if !existing.is_empty() => format!("{}; {}", existing, cookies),
                _ => cookies,
            };
            headers.insert(COOKIE, HeaderValue::from_str(&cookie)?);
        }

        trace!("Request headers: {:?}", headers);
        Ok(headers)
    }

    /// Reject responses that do not look like a file
    async fn check_content_type(&self, response: Response) -> Result<Response, DownloadError> {
        if !self.config.strict_content_type {
            return Ok(response);
        }

        let content_type = content_type_of(&response);
        if is_accepted_content_type(&content_type) {
            return Ok(response);
        }

        let body = read_body_prefix(response, BODY_PEEK_LIMIT).await;
        if looks_like_login_page(&body) {
            error!("Server returned a login page (content type: {})", content_type);
            return Err(DownloadError::AuthenticationRequired { content_type });
        }

        error!("Unexpected content type: {:?}", content_type);
        Err(DownloadError::UnexpectedContentType { content_type })
    }
}

/// Whether `content_type` is one we accept as a file
pub fn is_accepted_content_type(content_type: &str) -> bool {
    ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| content_type.contains(accepted))
}

/// Whether a response body is a login page rather than the file
pub fn looks_like_login_page(body: &str) -> bool {
    body.contains("login") || body.contains("authentication")
}

/// Parsed `Content-Range: bytes <start>-<end>/<total>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    /// `None` when the server sent `*`
    pub total: Option<u64>,
}

impl ContentRange {
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.trim().strip_prefix("bytes")?.trim_start();
        let (range, total) = rest.split_once('/')?;
        let (start, end) = range.split_once('-')?;
        let total = match total.trim() {
            "*" => None,
            t => Some(t.parse().ok()?),
        };
        Some(Self {
            start: start.trim().parse().ok()?,
            end: end.trim().parse().ok()?,
            total,
        })
    }
}

fn content_type_of(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn detect_file_type(url: &str, response: &Response) -> FileType {
    let file_type = FileType::detect(url, &content_type_of(response));
    debug!(
        "Detected file type: category={}, extension={:?}, mime={:?}",
        file_type.category, file_type.extension, file_type.mime_type
    );
    file_type
}

/// Read at most `limit` bytes of the body, then drop the rest of the response
async fn read_body_prefix(mut response: Response, limit: usize) -> String {
    let mut buf = Vec::with_capacity(limit.min(8 * 1024));
    while buf.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(limit - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Failed to read response body: {}", e);
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn read_error_body(response: Response) -> String {
    let body = read_body_prefix(response, BODY_PEEK_LIMIT).await;
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Copy the response body into `sink`, reporting each chunk to `observer`
async fn stream_body<S: DownloadSink + ?Sized>(
    mut response: Response,
    sink: &mut S,
    observer: &mut dyn ProgressObserver,
    total: Option<u64>,
    offset: u64,
) -> Result<u64, DownloadError> {
    observer.start(total, offset);

    let mut received: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| DownloadError::from(e).with_context("while reading response body"))?
    {
        let len = chunk.len() as u64;
        received += len;
        trace!("Received chunk of {} bytes ({} this session)", len, received);
        sink.write_chunk(chunk).await?;
        observer.advance(len);
    }

    let written = sink.finish().await?;
    observer.finish();
    Ok(written)
}
