use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};

use crate::dto::study_dto::{HistoryClearedResponse, HistoryListResponse};
use crate::error::{Error, Result};
use crate::models::QuizHistoryItem;
use crate::utils::request::user_id;
use crate::AppState;

fn require_user(headers: &HeaderMap) -> Result<String> {
    let user_id = user_id(headers);
    if user_id.is_empty() {
        return Err(Error::BadRequest("x-user-id header is required".to_string()));
    }
    Ok(user_id)
}

#[axum::debug_handler]
pub async fn list_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HistoryListResponse>> {
    let user_id = require_user(&headers)?;
    let items = state.history_service.list_for_user(&user_id).await?;
    Ok(Json(HistoryListResponse {
        total: items.len(),
        items,
    }))
}

#[axum::debug_handler]
pub async fn clear_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HistoryClearedResponse>> {
    let user_id = require_user(&headers)?;
    let deleted = state.history_service.delete_for_user(&user_id).await?;
    Ok(Json(HistoryClearedResponse { deleted }))
}

#[axum::debug_handler]
pub async fn get_history_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<QuizHistoryItem>> {
    let user_id = require_user(&headers)?;
    let item = state.history_service.get_by_id(id, &user_id).await?;
    Ok(Json(item))
}

#[axum::debug_handler]
pub async fn delete_history_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let user_id = require_user(&headers)?;
    state.history_service.delete_by_id(id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
