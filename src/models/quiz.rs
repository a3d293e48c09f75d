use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNANSWERED: i32 = -1;

const TOPICS_LABEL_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
}

impl QuizQuestion {
    pub fn correct_answer(&self) -> Option<&str> {
        usize::try_from(self.correct_answer_index)
            .ok()
            .and_then(|idx| self.options.get(idx))
            .map(String::as_str)
    }
}

/// Outcome of one question inside a scored attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
    pub user_answer_index: i32,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Excellent,
    Good,
    NeedsPractice,
}

impl Performance {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            p if p >= 80 => Performance::Excellent,
            p if p >= 60 => Performance::Good,
            _ => Performance::NeedsPractice,
        }
    }
}

/// A submitted and scored quiz, ready for the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub topics_label: String,
    pub questions: Vec<QuizQuestion>,
    pub user_answers: Vec<i32>,
    pub score: i32,
    pub total: i32,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
}

impl QuizAttempt {
    /// First 100 characters of the source text, with `...` appended when cut.
    pub fn topics_label(source: &str) -> String {
        let mut chars = source.chars();
        let head: String = chars.by_ref().take(TOPICS_LABEL_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}
