//! Pure utility functions: formatting, validation and lookups
//!
//! Everything here is stateless and callable anytime. Validators never
//! panic or error; they return `false`, `None` or a default on malformed
//! input.

pub mod format;
pub mod icons;
pub mod validate;

pub use format::{format_date, format_date_time, format_file_size};
pub use icons::file_icon;
pub use validate::{is_valid_date, is_valid_url};
