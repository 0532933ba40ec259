//! SQLite session.
//!
//! SQLite is dynamically typed, so values are converted by the storage class
//! of each value rather than the declared column type.
//!
//! SQLite has no unprepared execution path: every statement is compiled
//! before it runs. The compiled statement is used once and also supplies the
//! column shape of empty results.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};

use common::errors::{AppError, AppResult};
use common::models::{DbType, QueryResult, Row as JsonRow};

use super::{describe_columns, float_value, hex_bytes, Session};

/// Single SQLite connection owned by one request.
pub struct SqliteSession {
    conn: SqliteConnection,
}

impl SqliteSession {
    /// Opens the database file (or in-memory database) named by `url`.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let conn = SqliteConnection::connect(url)
            .await
            .map_err(AppError::Connection)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Session for SqliteSession {
    async fn execute(&mut self, statement: &str) -> AppResult<QueryResult> {
        let prepared = (&mut self.conn)
            .prepare(statement)
            .await
            .map_err(AppError::Execution)?;
        let columns = describe_columns(prepared.columns());

        let rows = prepared
            .query()
            .fetch_all(&mut self.conn)
            .await
            .map_err(AppError::Execution)?;

        Ok(QueryResult {
            rows: rows.iter().map(row_to_json).collect(),
            columns,
        })
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        self.conn.close().await.map_err(AppError::Connection)
    }

    fn db_type(&self) -> DbType {
        DbType::SQLite
    }
}

fn row_to_json(row: &SqliteRow) -> JsonRow {
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), column_value(row, col.ordinal())))
        .collect()
}

fn column_value(row: &SqliteRow, idx: usize) -> Value {
    let storage_class = match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    match storage_class.as_str() {
        "INTEGER" => row
            .try_get::<i64, _>(idx)
            .map(Value::from)
            .unwrap_or(Value::Null),
        "REAL" => row
            .try_get::<f64, _>(idx)
            .map(float_value)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(|v| Value::String(hex_bytes(&v)))
            .unwrap_or(Value::Null),
        _ => row
            .try_get_unchecked::<String, _>(idx)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
