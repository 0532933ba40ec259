//! Request-boundary error type.
//!
//! Every failure a request can hit is one `AppError` variant. All of them
//! answer `400 Bad Request` with `{"error": "<display text>"}`, so callers
//! only ever see one failure shape.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ErrorResponse;

/// Errors raised while handling a query request.
#[derive(Debug, Error)]
pub enum AppError {
    /// The body could not be read as a `QueryRequest`.
    #[error("{0}")]
    MalformedRequest(String),

    /// The connection URL names an engine the gateway has no driver for.
    #[error("unsupported database url scheme: {0}")]
    UnsupportedScheme(String),

    /// The session could not be established.
    #[error("{0}")]
    Connection(#[source] sqlx::Error),

    /// The statement failed to execute.
    #[error("{0}")]
    Execution(#[source] sqlx::Error),

    /// The configured statement timeout elapsed.
    #[error("statement did not complete within {}s", .0.as_secs())]
    Timeout(Duration),

    /// A handler panicked.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used across the gateway.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MalformedRequest(_) => "malformed_request",
            AppError::UnsupportedScheme(_) => "unsupported_scheme",
            AppError::Connection(_) => "connection",
            AppError::Execution(_) => "execution",
            AppError::Timeout(_) => "timeout",
            AppError::Internal(_) => "internal",
        }
    }

    /// Whether the failure originates on the gateway side rather than in the
    /// caller's input or the target database.
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Internal(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(kind = self.kind(), error = %self, "请求处理失败");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "请求处理失败");
        }

        (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_every_error_is_bad_request() {
        let errors = vec![
            AppError::MalformedRequest("missing field `url`".into()),
            AppError::UnsupportedScheme("redis".into()),
            AppError::Connection(sqlx::Error::PoolTimedOut),
            AppError::Execution(sqlx::Error::RowNotFound),
            AppError::Timeout(Duration::from_secs(5)),
            AppError::Internal("boom".into()),
        ];

        for err in errors {
            let (status, body) = body_of(err).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let message = body["error"].as_str().unwrap();
            assert!(!message.is_empty());
        }
    }

    #[tokio::test]
    async fn test_body_carries_display_text() {
        let (_, body) = body_of(AppError::UnsupportedScheme("redis".into())).await;
        assert_eq!(
            body,
            serde_json::json!({ "error": "unsupported database url scheme: redis" })
        );
    }

    #[test]
    fn test_driver_errors_display_verbatim() {
        let err = AppError::Execution(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
    }

    #[test]
    fn test_timeout_message() {
        let err = AppError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "statement did not complete within 30s");
        assert_eq!(err.kind(), "timeout");
    }
}
