//! Error types for the downloader
//!
//! Every failure on the download path is fatal and surfaces to the caller
//! as a `DownloadError`. Nothing is retried or recovered locally.

use std::fmt;

/// Error type for download operations
#[derive(Debug, Clone)]
pub enum DownloadError {
    /// The request could not be built or sent, or the body stream broke
    Request {
        message: String,
        url: Option<String>,
        source: Option<String>,
    },

    /// A new download got something other than 200 OK
    HttpStatus {
        status: u16,
        body: String,
    },

    /// A resume request got something other than 206 Partial Content
    ResumeUnsupported {
        status: u16,
        reason: String,
    },

    /// The server rejected the range, usually because the file is already complete
    RangeNotSatisfiable {
        offset: u64,
    },

    /// The server answered with a login page instead of the file
    AuthenticationRequired {
        content_type: String,
    },

    /// The response content type is not one we accept as a file
    UnexpectedContentType {
        content_type: String,
    },

    /// File I/O errors
    Storage {
        message: String,
        path: Option<String>,
        source: Option<String>,
    },

    /// Configuration errors
    Config {
        message: String,
        field: Option<String>,
    },

    /// Validation errors
    Validation {
        message: String,
        field: Option<String>,
    },
}

impl DownloadError {
    /// Create a new Request error
    pub fn request_error(message: impl Into<String>) -> Self {
        DownloadError::Request {
            message: message.into(),
            url: None,
            source: None,
        }
    }

    /// Create a new Request error with url and source
    pub fn request_error_full(
        message: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        DownloadError::Request {
            message: message.into(),
            url: Some(url.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new HttpStatus error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        DownloadError::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a new ResumeUnsupported error
    pub fn resume_unsupported(status: u16, reason: impl Into<String>) -> Self {
        DownloadError::ResumeUnsupported {
            status,
            reason: reason.into(),
        }
    }

    /// Create a new Storage error with path
    pub fn storage_error_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        DownloadError::Storage {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Create a new Storage error with path and source
    pub fn storage_error_full(
        message: impl Into<String>,
        path: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        DownloadError::Storage {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new Config error
    pub fn config_error(message: impl Into<String>) -> Self {
        DownloadError::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new Config error with field
    pub fn config_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        DownloadError::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new Validation error with field
    pub fn validation_error_with_field(
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        DownloadError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = context.into();
        match &mut self {
            DownloadError::Request { source, .. } | DownloadError::Storage { source, .. } => {
                *source = Some(
                    source
                        .as_ref()
                        .map_or_else(|| ctx.clone(), |s| format!("{}: {}", s, ctx)),
                );
            }
            _ => {}
        }
        self
    }

    /// HTTP status code attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            DownloadError::HttpStatus { status, .. }
            | DownloadError::ResumeUnsupported { status, .. } => Some(*status),
            DownloadError::RangeNotSatisfiable { .. } => Some(416),
            _ => None,
        }
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Request { message, url, source } => {
                match (url, source) {
                    (Some(u), Some(s)) => {
                        write!(f, "Request error: {} (url: {}, source: {})", message, u, s)
                    }
                    (Some(u), None) => write!(f, "Request error: {} (url: {})", message, u),
                    (None, Some(s)) => write!(f, "Request error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Request error: {}", message),
                }
            }
            DownloadError::HttpStatus { status, body } => {
                if body.is_empty() {
                    write!(f, "Server returned status {}", status)
                } else {
                    write!(f, "Server returned status {}: {}", status, body)
                }
            }
            DownloadError::ResumeUnsupported { status, reason } => {
                write!(f, "Server does not support resume: {} {}", status, reason)
            }
            DownloadError::RangeNotSatisfiable { offset } => {
                write!(
                    f,
                    "Range not satisfiable at offset {}: file may already be complete",
                    offset
                )
            }
            DownloadError::AuthenticationRequired { content_type } => {
                write!(
                    f,
                    "Authentication failed: server returned login page instead of file \
                     (content type: {})",
                    content_type
                )
            }
            DownloadError::UnexpectedContentType { content_type } => {
                if content_type.is_empty() {
                    write!(f, "Missing content type. Server might be requiring authentication")
                } else {
                    write!(
                        f,
                        "Unexpected content type: {}. Server might be requiring authentication",
                        content_type
                    )
                }
            }
            DownloadError::Storage { message, path, source } => {
                match (path, source) {
                    (Some(p), Some(s)) => {
                        write!(f, "Storage error: {} (path: {}, source: {})", message, p, s)
                    }
                    (Some(p), None) => write!(f, "Storage error: {} (path: {})", message, p),
                    (None, Some(s)) => write!(f, "Storage error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Storage error: {}", message),
                }
            }
            DownloadError::Config { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Config error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Config error: {}", message)
                }
            }
            DownloadError::Validation { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Validation error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Validation error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::storage_error_full(
            err.to_string(),
            "unknown".to_string(),
            err.kind().to_string(),
        )
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_else(|| "unknown".to_string());
        let message = if err.is_timeout() {
            "Request timed out"
        } else if err.is_connect() {
            "Failed to connect"
        } else if err.is_body() || err.is_decode() {
            "Failed to read response body"
        } else {
            "Failed to make request"
        };
        DownloadError::request_error_full(message, url, err.to_string())
    }
}

impl From<url::ParseError> for DownloadError {
    fn from(err: url::ParseError) -> Self {
        DownloadError::validation_error_with_field(format!("Invalid URL: {}", err), "url")
    }
}

impl From<reqwest::header::InvalidHeaderName> for DownloadError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        DownloadError::validation_error_with_field(
            format!("Invalid header name: {}", err),
            "header",
        )
    }
}

impl From<reqwest::header::InvalidHeaderValue> for DownloadError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        DownloadError::validation_error_with_field(
            format!("Invalid header value: {}", err),
            "header",
        )
    }
}
