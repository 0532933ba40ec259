//! Per-request database sessions.
//!
//! A session wraps exactly one driver connection. It is opened for a single
//! request, runs one statement, and is closed before the handler returns.
//! Dropping a session without closing it still shuts its socket.

mod mysql;
mod postgres;
mod sqlite;

use async_trait::async_trait;
use sqlx::{Column, TypeInfo};

use common::errors::AppResult;
use common::models::{ColumnInfo, DbType, QueryResult};

pub use self::mysql::MySqlSession;
pub use self::postgres::PgSession;
pub use self::sqlite::SqliteSession;

/// A live connection to one target database.
#[async_trait]
pub trait Session: Send {
    /// Runs `statement` verbatim and buffers its full result.
    async fn execute(&mut self, statement: &str) -> AppResult<QueryResult>;

    /// Gracefully terminates the connection.
    async fn close(self: Box<Self>) -> AppResult<()>;

    /// Engine behind this session.
    fn db_type(&self) -> DbType;
}

/// Opens a session to the database named by `url`.
///
/// # Errors
/// `AppError::UnsupportedScheme` for an unknown scheme, otherwise
/// `AppError::Connection` with the driver's message.
pub async fn open(url: &str) -> AppResult<Box<dyn Session>> {
    let session: Box<dyn Session> = match DbType::from_url(url)? {
        DbType::Postgres => Box::new(PgSession::connect(url).await?),
        DbType::MySQL => Box::new(MySqlSession::connect(url).await?),
        DbType::SQLite => Box::new(SqliteSession::connect(url).await?),
    };
    Ok(session)
}

/// Column descriptors in output order.
fn describe_columns<C: Column>(columns: &[C]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Renders binary data the way PostgreSQL prints `bytea`: `\x` then hex.
fn hex_bytes(bytes: &[u8]) -> String {
    format!("\\x{}", hex::encode(bytes))
}

/// JSON number from a float; NaN and infinities have no JSON form.
fn float_value(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
