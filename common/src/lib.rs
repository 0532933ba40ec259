//! Shared building blocks for the SQL query gateway.
//!
//! - `config`: environment-driven service configuration
//! - `errors`: the request-boundary error type and its HTTP mapping
//! - `middleware`: request-id propagation
//! - `models`: request/response bodies and engine selection
//! - `response`: error response body
//! - `utils`: connection URL helpers

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
