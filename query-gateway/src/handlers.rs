//! Handler模块

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use common::errors::{AppError, AppResult};
use common::models::query::{QueryRequest, QueryResult};

use crate::service::QueryService;
use crate::state::AppState;

/// 执行 SQL 查询
///
/// `POST /` with `{"url", "query"}`. Answers `200` with the full result or
/// `400` with `{"error"}`; body rejections take the same `400` path.
pub async fn execute_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<QueryResult>> {
    let Json(req) = payload.map_err(|rejection| AppError::MalformedRequest(rejection.body_text()))?;

    let service = QueryService::new(state.config.statement_timeout);
    let result = service.execute(req).await?;
    Ok(Json(result))
}
