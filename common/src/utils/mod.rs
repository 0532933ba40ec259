//! Utility functions and helpers.

pub mod url_redactor;

// Re-export commonly used types
pub use url_redactor::redact_url;
