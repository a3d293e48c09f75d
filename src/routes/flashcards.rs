use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use validator::Validate;

use crate::dto::study_dto::{GenerateFlashcardsPayload, GenerateFlashcardsResponse};
use crate::error::{Error, Result};
use crate::models::StudyRequest;
use crate::utils::request::user_id;
use crate::AppState;

#[axum::debug_handler]
pub async fn generate_flashcards(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<GenerateFlashcardsPayload>,
) -> Result<Json<GenerateFlashcardsResponse>> {
    if payload.content.trim().is_empty() {
        return Err(Error::BadRequest("content must not be empty".to_string()));
    }
    payload.validate()?;

    let user_id = user_id(&headers);
    tracing::info!(user_id = %user_id, chars = payload.content.chars().count(), "flashcard generation requested");

    let request = StudyRequest::new(payload.content, payload.instruction);
    let flashcards = state
        .study_service
        .generate_flashcards(&user_id, &request)
        .await?;

    Ok(Json(GenerateFlashcardsResponse {
        count: flashcards.len(),
        flashcards,
    }))
}
