use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    /// Builds a card from raw text, trimming both sides. Returns `None` when
    /// either side ends up empty.
    pub fn new(question: &str, answer: &str) -> Option<Self> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }
}

/// Free study text plus an optional instruction for the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyRequest {
    pub content: String,
    #[serde(default)]
    pub instruction: Option<String>,
}

impl StudyRequest {
    pub fn new(content: impl Into<String>, instruction: Option<String>) -> Self {
        Self {
            content: content.into(),
            instruction,
        }
    }

    pub fn instruction(&self) -> &str {
        self.instruction.as_deref().unwrap_or("")
    }
}
