use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::quiz::QuestionResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizHistoryEntry {
    pub id: i64,
    pub timestamp: i64,
    pub topics: String,
    pub score: i64,
    pub total_questions: i64,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizHistoryItem {
    pub id: i64,
    pub timestamp: i64,
    pub topics: String,
    pub score: i64,
    pub total_questions: i64,
    pub user_id: Option<String>,
    pub questions: Vec<QuestionResult>,
}
