//! Error types for pagekit-core

use thiserror::Error;

/// Page helper error type
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Clipboard write failed: {message}")]
    Clipboard { message: String },
}
