//! Error types for pagekit-dom

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("Clipboard write failed: {message}")]
    Clipboard { message: String },
}
