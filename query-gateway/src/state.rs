//! Application state for the query gateway.

use common::config::AppConfig;

/// Application state shared across handlers.
///
/// Holds configuration only; database sessions never outlive a request.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}
