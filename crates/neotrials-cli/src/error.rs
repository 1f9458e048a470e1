//! Error types for the neotrials CLI
//!
//! This module provides user-friendly error types with clear, actionable messages
//! that help users understand what went wrong and how to fix it.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// A classified failure for one page request against one registry base.
///
/// These are recovered locally by endpoint failover and only surface to the
/// user inside [`CliError::AllEndpointsFailed`] once every base has failed
/// for the same page.
#[derive(Error, Debug)]
pub enum FetchFailure {
    /// Connection, timeout, or HTTP status failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with something other than JSON. Captive portals
    /// and intercepting proxies tend to return HTML error pages with a 200.
    #[error("unexpected content type '{content_type}': {snippet}")]
    UnexpectedContentType {
        content_type: String,
        snippet: String,
    },

    /// The body did not parse as JSON
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl FetchFailure {
    /// Create a transport failure
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an unexpected-content-type failure, trimming the body to a
    /// short snippet so HTML error pages do not flood the diagnostics
    pub fn unexpected_content_type(content_type: impl Into<String>, body: &str) -> Self {
        let snippet: String = body.chars().take(120).collect();
        Self::UnexpectedContentType {
            content_type: content_type.into(),
            snippet,
        }
    }

    /// Create a malformed-payload failure
    pub fn malformed_payload(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }
}

/// Comprehensive error type for CLI operations
///
/// All errors are designed to be user-facing with clear messages and suggestions.
#[derive(Error, Debug)]
pub enum CliError {
    /// Every configured registry base failed for the same page request
    #[error(
        "All registry endpoints failed while fetching page {page}: {}. Check your internet connection, or pass --base-url to point at a reachable mirror.",
        .attempts.join("; ")
    )]
    AllEndpointsFailed { page: usize, attempts: Vec<String> },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your command-line flags and environment variables.")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP client construction failed
    #[error("Network client error: {0}. Check your proxy and TLS environment settings.")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an all-endpoints-failed error from the per-base failure list
    pub fn all_endpoints_failed(page: usize, attempts: Vec<String>) -> Self {
        Self::AllEndpointsFailed { page, attempts }
    }
}
