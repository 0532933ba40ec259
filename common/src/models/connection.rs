//! Connection target models.
//!
//! Maps a connection URL to the database engine that serves it.

use crate::errors::{AppError, AppResult};

/// Database type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    /// MySQL / MariaDB database.
    MySQL,
    /// PostgreSQL database.
    Postgres,
    /// SQLite database.
    SQLite,
}

impl DbType {
    /// Selects the engine from the URL scheme.
    ///
    /// # Errors
    /// Returns `AppError::UnsupportedScheme` when the scheme is missing or
    /// names no supported engine.
    pub fn from_url(url: &str) -> AppResult<Self> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme.trim().to_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(DbType::Postgres),
            "mysql" | "mariadb" => Ok(DbType::MySQL),
            "sqlite" => Ok(DbType::SQLite),
            "" => Err(AppError::UnsupportedScheme("<none>".to_string())),
            other => Err(AppError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::MySQL => write!(f, "mysql"),
            DbType::Postgres => write!(f, "postgres"),
            DbType::SQLite => write!(f, "sqlite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_selection() {
        assert_eq!(
            DbType::from_url("postgres://u:p@localhost/db").unwrap(),
            DbType::Postgres
        );
        assert_eq!(
            DbType::from_url("postgresql://localhost/db").unwrap(),
            DbType::Postgres
        );
        assert_eq!(DbType::from_url("MySQL://root@db/app").unwrap(), DbType::MySQL);
        assert_eq!(DbType::from_url("mariadb://root@db/app").unwrap(), DbType::MySQL);
        assert_eq!(DbType::from_url("sqlite::memory:").unwrap(), DbType::SQLite);
        assert_eq!(DbType::from_url("sqlite:///tmp/a.db").unwrap(), DbType::SQLite);
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = DbType::from_url("redis://localhost").unwrap_err();
        assert_eq!(err.to_string(), "unsupported database url scheme: redis");

        let err = DbType::from_url("").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedScheme(_)));
    }
}
