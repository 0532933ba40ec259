//! API response body types.
//!
//! Successful responses serialize the payload directly; only failures use a
//! wrapper.

use serde::{Deserialize, Serialize};

/// Body of every failed request: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Display text of the underlying failure.
    pub error: String,
}

impl ErrorResponse {
    /// Creates an error body from any message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl<E: std::error::Error> From<&E> for ErrorResponse {
    fn from(err: &E) -> Self {
        Self::new(err.to_string())
    }
}
