//! Error types for pagekit-client

use thiserror::Error;

/// Request helper error type
///
/// One failure kind per call; the caller decides retry policy.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed with status {status}")]
    Status { status: u16 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Failed to parse response body: {message}")]
    Parse { message: String },

    #[error("Invalid request header {name}: {message}")]
    InvalidHeader { name: String, message: String },
}

/// Result type with ApiError
pub type ApiResult<T> = Result<T, ApiError>;
