//! Download task and configuration
//!
//! A `DownloadTask` describes one transfer. A `DownloadConfig` holds the
//! client-wide settings shared by every transfer of a `Downloader`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Default capacity of the buffered file writer
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;
/// Default retry count
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay between retries
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
/// Default client-level timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mast/1.0";

/// Settings shared by every transfer
#[derive(Debug, Clone, Serialize)]
pub struct DownloadConfig {
    /// Capacity of the buffered file writer
    pub chunk_size: usize,
    /// Retry attempts (recorded, never used to retry)
    pub max_retries: u32,
    /// Delay between retries (recorded, never used to retry)
    pub retry_delay: Duration,
    /// Resume from an existing partial file
    pub resume_enabled: bool,
    /// Connect and read timeout for the HTTP client
    pub timeout: Duration,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Reject responses whose content type does not look like a file
    pub strict_content_type: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            resume_enabled: true,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            strict_content_type: true,
        }
    }
}

impl DownloadConfig {
    /// Replace zero values with their defaults
    pub fn normalized(mut self) -> Self {
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.max_retries == 0 {
            self.max_retries = DEFAULT_MAX_RETRIES;
        }
        if self.retry_delay.is_zero() {
            self.retry_delay = DEFAULT_RETRY_DELAY;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.user_agent.is_empty() {
            self.user_agent = DEFAULT_USER_AGENT.to_string();
        }
        self
    }
}

/// A single transfer request
#[derive(Debug, Clone, Default)]
pub struct DownloadTask {
    /// Source URL
    pub url: String,
    /// Destination file path
    pub destination: PathBuf,
    /// Custom headers, applied in order over the defaults
    pub headers: Vec<(String, String)>,
    /// Cookies as name/value pairs
    pub cookies: Vec<(String, String)>,
}

impl DownloadTask {
    /// Create a task with no custom headers or cookies
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            headers: Vec::new(),
            cookies: Vec::new(),
        }
    }

    /// Add a custom header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a cookie
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Length of the partial file on disk, 0 when there is none
    pub fn existing_len(&self) -> u64 {
        std::fs::metadata(&self.destination)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Whether a non-empty partial file exists to resume from
    pub fn can_resume(&self) -> bool {
        self.existing_len() > 0
    }

    /// Value of the `Cookie` header, if any cookies are set
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let joined = self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DownloadConfig::default();
        assert_eq!(config.chunk_size, 10 * 1024 * 1024);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, "Mast/1.0");
        assert!(config.resume_enabled);
        assert!(config.strict_content_type);
    }

    #[test]
    fn test_config_normalized() {
        let config = DownloadConfig {
            chunk_size: 0,
            max_retries: 0,
            retry_delay: Duration::ZERO,
            resume_enabled: false,
            timeout: Duration::ZERO,
            user_agent: String::new(),
            strict_content_type: false,
        }
        .normalized();

        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.retry_delay, DEFAULT_RETRY_DELAY);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(!config.resume_enabled);
        assert!(!config.strict_content_type);
    }

    #[test]
    fn test_cookie_header() {
        let task = DownloadTask::new("http://example.com/a", "a")
            .with_cookie("session", "abc")
            .with_cookie("theme", "dark");
        assert_eq!(task.cookie_header().as_deref(), Some("session=abc; theme=dark"));

        let task = DownloadTask::new("http://example.com/a", "a");
        assert!(task.cookie_header().is_none());
    }

    #[test]
    fn test_can_resume_missing_file() {
        let task = DownloadTask::new("http://example.com/a", "/nonexistent/dir/file.bin");
        assert!(!task.can_resume());
        assert_eq!(task.existing_len(), 0);
    }

    #[test]
    fn test_can_resume_existing_file() {
        let dir = std::env::temp_dir().join("mast_task_can_resume");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("partial.bin");

        std::fs::write(&path, b"").unwrap();
        let task = DownloadTask::new("http://example.com/a", &path);
        assert!(!task.can_resume());

        std::fs::write(&path, b"12345").unwrap();
        assert!(task.can_resume());
        assert_eq!(task.existing_len(), 5);

        // Cleanup
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_can_resume_directory() {
        let task = DownloadTask::new("http://example.com/a", std::env::temp_dir());
        assert!(!task.can_resume());
    }
}
