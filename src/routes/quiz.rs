use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use validator::Validate;

use crate::dto::study_dto::{BuildQuizPayload, BuildQuizResponse, SubmitQuizPayload, SubmitQuizResponse};
use crate::error::{Error, Result};
use crate::models::{Flashcard, QuizQuestion, UNANSWERED};
use crate::utils::request::user_id;
use crate::AppState;

#[axum::debug_handler]
pub async fn build_quiz(
    State(state): State<AppState>,
    Json(payload): Json<BuildQuizPayload>,
) -> Result<Json<BuildQuizResponse>> {
    let flashcards = checked_flashcards(&payload.flashcards)?;
    let questions = state
        .study_service
        .build_quiz(&flashcards, &mut rand::thread_rng());
    Ok(Json(BuildQuizResponse { questions }))
}

#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitQuizPayload>,
) -> Result<(StatusCode, Json<SubmitQuizResponse>)> {
    payload.validate()?;
    check_answers(&payload.questions, &payload.answers)?;

    let user_id = user_id(&headers);
    let submitted = state
        .study_service
        .submit_quiz(&user_id, &payload.source_text, payload.questions, &payload.answers)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitQuizResponse {
            id: submitted.id,
            attempt: submitted.attempt,
            results: submitted.results,
            percentage: submitted.percentage,
            performance: submitted.performance,
        }),
    ))
}

/// Re-applies the card rules (trimmed, both sides non-empty) to
/// client-supplied flashcards.
fn checked_flashcards(cards: &[Flashcard]) -> Result<Vec<Flashcard>> {
    cards
        .iter()
        .enumerate()
        .map(|(idx, card)| {
            Flashcard::new(&card.question, &card.answer).ok_or_else(|| {
                Error::BadRequest(format!("flashcard {} has an empty question or answer", idx + 1))
            })
        })
        .collect()
}

fn check_answers(questions: &[QuizQuestion], answers: &[i32]) -> Result<()> {
    if answers.len() > questions.len() {
        return Err(Error::BadRequest(format!(
            "{} answers submitted for {} questions",
            answers.len(),
            questions.len()
        )));
    }
    for (idx, (question, &answer)) in questions.iter().zip(answers).enumerate() {
        let in_range = answer >= 0 && (answer as usize) < question.options.len();
        if answer != UNANSWERED && !in_range {
            return Err(Error::BadRequest(format!(
                "answer {} for question {} is out of range",
                answer,
                idx + 1
            )));
        }
    }
    Ok(())
}
