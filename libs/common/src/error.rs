//! Custom error types for the common library
//!
//! This module defines the errors raised while talking to the hosted data
//! service. They are mapped to HTTP statuses by the API service.

use thiserror::Error;

/// Custom error type for data service operations
#[derive(Error, Debug)]
pub enum DataError {
    /// The request never produced a response (connect failure, timeout, ...)
    #[error("Data service request error: {0}")]
    Request(#[source] reqwest::Error),

    /// The data service answered with a non-success status
    #[error("Data service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into the expected shape
    #[error("Failed to decode data service response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A write succeeded but the canonical row was not returned
    #[error("Data service did not return the written row for table {0}")]
    MissingEcho(String),

    /// Configuration error
    #[error("Data service configuration error: {0}")]
    Configuration(String),
}

impl DataError {
    /// Whether the caller may reasonably repeat the request.
    ///
    /// Nothing in this workspace retries on its own; the flag only drives the
    /// status code handed back to HTTP clients.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::MissingEcho(_) | DataError::Request(_))
    }
}

/// Type alias for Result with DataError
pub type DataResult<T> = Result<T, DataError>;
