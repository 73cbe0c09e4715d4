//! Shared utility functions.
//!
//! - [`content_length`] - Declared body length of HTTP responses

pub mod content_length;

pub use content_length::{declared_content_length, header_content_length};
