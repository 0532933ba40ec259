//! Shared data models.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::DbType;
pub use query::{ColumnInfo, QueryRequest, QueryResult, Row};
