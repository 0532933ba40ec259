//! PostgreSQL session.
//!
//! Statements go out over the simple query protocol: the text is sent as is,
//! nothing is prepared, and every value comes back in its text form. Values
//! are then converted by the column's type name.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::debug;

use common::errors::{AppError, AppResult};
use common::models::{ColumnInfo, DbType, QueryResult, Row as JsonRow};

use super::{describe_columns, float_value, Session};

/// Single PostgreSQL connection owned by one request.
pub struct PgSession {
    conn: PgConnection,
}

impl PgSession {
    /// Opens a connection to `url`.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let conn = PgConnection::connect(url)
            .await
            .map_err(AppError::Connection)?;
        Ok(Self { conn })
    }

    /// Column shape of a statement that produced no rows.
    ///
    /// Parsing the statement server-side yields its row description without
    /// running it. Statements the server cannot describe have no columns.
    async fn describe(&mut self, statement: &str) -> Vec<ColumnInfo> {
        match (&mut self.conn).prepare(statement).await {
            Ok(prepared) => describe_columns(prepared.columns()),
            Err(err) => {
                debug!(error = %err, "statement has no describable result shape");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Session for PgSession {
    async fn execute(&mut self, statement: &str) -> AppResult<QueryResult> {
        // A bare &str carries no arguments, so sqlx sends a simple Query.
        let rows = (&mut self.conn)
            .fetch_all(statement)
            .await
            .map_err(AppError::Execution)?;

        let columns = match rows.first() {
            Some(row) => describe_columns(row.columns()),
            None => self.describe(statement).await,
        };

        Ok(QueryResult {
            rows: rows.iter().map(row_to_json).collect(),
            columns,
        })
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        self.conn.close().await.map_err(AppError::Connection)
    }

    fn db_type(&self) -> DbType {
        DbType::Postgres
    }
}

fn row_to_json(row: &PgRow) -> JsonRow {
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), column_value(row, col.ordinal())))
        .collect()
}

fn column_value(row: &PgRow, idx: usize) -> Value {
    let raw = match row.try_get_raw(idx) {
        Ok(raw) => raw,
        Err(_) => return Value::Null,
    };
    if raw.is_null() {
        return Value::Null;
    }
    let type_name = raw.type_info().name().to_string();
    let text = match raw.as_str() {
        Ok(text) => text,
        Err(_) => return Value::Null,
    };

    match type_name.strip_suffix("[]") {
        Some(element_type) => array_value(row, idx, element_type, text),
        None => text_value(&type_name, text),
    }
}

/// One-dimensional array literal (`{1,NULL,3}`) to a JSON array.
///
/// Anything sqlx cannot split (multi-dimensional arrays, explicit bounds)
/// stays in its text form.
fn array_value(row: &PgRow, idx: usize, element_type: &str, text: &str) -> Value {
    if text == "{}" {
        return Value::Array(Vec::new());
    }
    match row.try_get_unchecked::<Vec<Option<String>>, _>(idx) {
        Ok(elements) if !text.starts_with("{{") => Value::Array(
            elements
                .iter()
                .map(|element| match element {
                    Some(element) => text_value(element_type, element),
                    None => Value::Null,
                })
                .collect(),
        ),
        _ => Value::String(text.to_string()),
    }
}

/// Converts one value in PostgreSQL text output format.
fn text_value(type_name: &str, text: &str) -> Value {
    match type_name {
        "BOOL" => Value::Bool(text == "t"),
        "INT2" | "INT4" | "INT8" | "OID" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "FLOAT4" | "FLOAT8" => text.parse::<f64>().map(float_value).unwrap_or(Value::Null),
        "JSON" | "JSONB" => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        }
        "TIMESTAMPTZ" => DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z")
            .map(|v| Value::String(v.with_timezone(&Utc).to_rfc3339()))
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "TIMESTAMP" => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .map(|v| Value::String(v.and_utc().to_rfc3339()))
            .unwrap_or_else(|_| Value::String(text.to_string())),
        // NUMERIC, BYTEA (`\x` hex), DATE, TIME, UUID, INTERVAL, INET,
        // enums and text types already print the way they are returned.
        _ => Value::String(text.to_string()),
    }
}
