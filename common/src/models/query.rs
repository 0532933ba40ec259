//! SQL query models.
//!
//! Contains the request and result bodies of the gateway endpoint.

use serde::{Deserialize, Serialize};

/// One result row: column name to JSON value, in output column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Request body for executing a SQL statement.
///
/// Neither field is inspected; the statement runs verbatim against whatever
/// target the URL names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Connection URL of the target database.
    pub url: String,

    /// SQL statement to execute.
    pub query: String,
}

/// Result of a SQL statement execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Row data, fully buffered.
    pub rows: Vec<Row>,

    /// Column information, one entry per output column.
    pub columns: Vec<ColumnInfo>,
}

/// Column information in query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Driver type name (e.g. `INT4`, `TEXT`), sent as `type`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a column descriptor.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

impl QueryResult {
    /// Number of rows returned.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
