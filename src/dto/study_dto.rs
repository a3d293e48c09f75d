use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Flashcard, Performance, QuestionResult, QuizAttempt, QuizHistoryEntry, QuizQuestion};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateFlashcardsPayload {
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    #[validate(length(max = 2000))]
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFlashcardsResponse {
    pub flashcards: Vec<Flashcard>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildQuizPayload {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildQuizResponse {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitQuizPayload {
    #[serde(default)]
    pub source_text: String,
    #[validate(length(min = 1, message = "a quiz needs at least one question"))]
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub answers: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub id: i64,
    pub attempt: QuizAttempt,
    pub results: Vec<QuestionResult>,
    pub percentage: u32,
    pub performance: Performance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryListResponse {
    pub items: Vec<QuizHistoryEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryClearedResponse {
    pub deleted: u64,
}
