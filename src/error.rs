//! Error types for the PubMed fetcher.
//!
//! The library's fallible functions return `Result<T, FetcherError>`. The
//! contract-level entry points (`search`, `fetch_details`) swallow these into
//! an empty list after logging them.

use thiserror::Error;

/// Main error type for fetcher operations.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// Network/HTTP request error (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// E-utilities returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// JSON body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML body is not well formed
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Client configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias using `FetcherError`
pub type Result<T> = std::result::Result<T, FetcherError>;

impl FetcherError {
    /// Whether the error came from the transport layer rather than from
    /// decoding a response body.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetcherError::Network(_) | FetcherError::Api { .. })
    }
}
