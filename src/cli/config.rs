//! CLI configuration module
//!
//! Turns the `download` arguments into a validated task and download config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use crate::cli::args::DownloadArgs;
use crate::download::{DownloadConfig, DownloadTask};
use crate::error::DownloadError;

/// Filename used when the URL gives nothing better
pub const FALLBACK_FILENAME: &str = "download";

/// Configuration for one download invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Transfer request
    pub task: DownloadTask,
    /// Downloader settings
    pub download: DownloadConfig,
    /// Print the outcome as JSON
    pub json: bool,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: &DownloadArgs) -> Result<Self, DownloadError> {
        let url = parse_url(&args.url)?;

        let file_name = match &args.file {
            Some(name) => name.clone(),
            None => filename_from_url(&url),
        };
        let destination = match &args.location {
            Some(dir) => dir.join(&file_name),
            None => PathBuf::from(&file_name),
        };
        debug!("Resolved destination: {}", destination.display());

        let task = DownloadTask {
            url: url.to_string(),
            destination,
            headers: parse_headers(&args.headers),
            cookies: parse_cookies(&args.cookies),
        };

        let download = DownloadConfig {
            max_retries: args.retries,
            resume_enabled: args.resume,
            timeout: Duration::from_secs(args.timeout),
            strict_content_type: !args.any_content_type,
            ..DownloadConfig::default()
        };

        Ok(Self {
            task,
            download,
            json: args.json,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.download.timeout.is_zero() {
            return Err(DownloadError::config_error_with_field(
                "timeout must be at least 1 second",
                "timeout",
            ));
        }

        match self.task.destination.file_name().and_then(|n| n.to_str()) {
            Some(name) if !name.is_empty() => {}
            _ => {
                return Err(DownloadError::validation_error_with_field(
                    format!("Invalid destination filename: {}", self.task.destination.display()),
                    "file",
                ))
            }
        }

        for (name, value) in &self.task.headers {
            HeaderName::from_bytes(name.as_bytes())?;
            HeaderValue::from_str(value)?;
        }
        for (name, value) in &self.task.cookies {
            HeaderValue::from_str(&format!("{}={}", name, value))?;
        }

        Ok(())
    }

    /// Destination path
    pub fn destination(&self) -> &Path {
        &self.task.destination
    }
}

/// Parse and check the download URL
pub fn parse_url(raw: &str) -> Result<Url, DownloadError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DownloadError::validation_error_with_field(
            format!("Unsupported URL scheme: {}", other),
            "url",
        )),
    }
}

/// Default destination filename for `url`
pub fn filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Parse `name=value` cookie arguments, skipping malformed ones
pub fn parse_cookies(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|cookie| {
            match cookie.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    Some((name.trim().to_string(), value.trim().to_string()))
                }
                _ => {
                    warn!("Ignoring malformed cookie {:?} (expected name=value)", cookie);
                    None
                }
            }
        })
        .collect()
}

/// Parse `Name: value` header arguments, skipping malformed ones
pub fn parse_headers(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|header| {
            match header.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    Some((name.trim().to_string(), value.trim().to_string()))
                }
                _ => {
                    warn!("Ignoring malformed header {:?} (expected name:value)", header);
                    None
                }
            }
        })
        .collect()
}
