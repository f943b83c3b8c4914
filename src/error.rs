//! Error types and handling for simple-http
//!
//! Every failure surfaces as a typed [`HttpError`] instead of being logged and
//! swallowed, so callers can tell a malformed address from a timeout from a
//! payload that does not fit the expected shape.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for simple-http operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// Coarse classification of an [`HttpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied an unusable request description
    InvalidInput,
    /// The request could not be delivered or the response not read
    Transport,
    /// The request did not complete within its timeout
    Timeout,
    /// The server answered with a non-success status
    Status,
    /// Bytes could not be turned into a domain object
    Decode,
    /// A domain object could not be turned into bytes
    Encode,
    /// Configuration could not be read, written or validated
    Config,
    /// Runtime or client setup failure, or a dropped completion
    Internal,
}

/// Comprehensive error types for simple-http operations
#[derive(Error, Debug)]
pub enum HttpError {
    // ═══════════════════════════════════════════════════════════════
    // Request Construction
    // ═══════════════════════════════════════════════════════════════
    /// Address could not be parsed into an absolute http(s) URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Method is not a valid HTTP token
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Header name or value rejected
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Invalid input argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ═══════════════════════════════════════════════════════════════
    // Network & HTTP Errors
    // ═══════════════════════════════════════════════════════════════
    /// Failed to connect to the target host
    #[error("Failed to connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other transport failure reported by the HTTP client
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request did not complete in time
    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Non-success status, only produced by `Response::error_for_status`
    #[error("HTTP status {status} {reason}")]
    Status { status: u16, reason: String },

    // ═══════════════════════════════════════════════════════════════
    // Payload Errors
    // ═══════════════════════════════════════════════════════════════
    /// Input is not syntactically valid JSON (including truncated input)
    #[error("Malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// JSON is valid but does not fit the target type
    #[error("JSON does not match the expected shape: {0}")]
    ShapeMismatch(#[source] serde_json::Error),

    /// A timestamp field matched none of the accepted formats
    #[error("Invalid timestamp '{value}': expected one of {formats:?}")]
    InvalidTimestamp { value: String, formats: Vec<String> },

    /// Failed to serialize a domain object
    #[error("Encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════
    /// Failed to read configuration file
    #[error("Failed to read config from {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    /// Failed to write configuration file
    #[error("Failed to write config to {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ═══════════════════════════════════════════════════════════════
    // Other Errors
    // ═══════════════════════════════════════════════════════════════
    /// Runtime or client could not be used
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// The request task ended without reporting a result
    #[error("Request cancelled before completion")]
    Cancelled,
}

impl HttpError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. }
            | Self::InvalidMethod(_)
            | Self::InvalidHeader { .. }
            | Self::InvalidArgument(_) => ErrorKind::InvalidInput,
            Self::Connection { .. } | Self::Transport(_) => ErrorKind::Transport,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Status { .. } => ErrorKind::Status,
            Self::MalformedJson(_) | Self::ShapeMismatch(_) | Self::InvalidTimestamp { .. } => {
                ErrorKind::Decode
            }
            Self::Encode(_) => ErrorKind::Encode,
            Self::ConfigRead { .. } | Self::ConfigWrite { .. } | Self::InvalidConfig(_) => {
                ErrorKind::Config
            }
            Self::Runtime(_) | Self::Cancelled => ErrorKind::Internal,
        }
    }

    /// Whether the error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Map a transport failure for `url`, using `timeout` when it timed out
    pub(crate) fn from_transport(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::Connection {
                url: url.to_string(),
                source: err,
            }
        } else {
            Self::Transport(err)
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            let url = err
                .url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
            Self::Connection { url, source: err }
        } else {
            Self::Transport(err)
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            Self::MalformedJson(err)
        } else {
            Self::ShapeMismatch(err)
        }
    }
}
