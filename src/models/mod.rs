pub mod flashcard;
pub mod quiz;
pub mod quiz_history;

pub use flashcard::{Flashcard, StudyRequest};
pub use quiz::{Performance, QuestionResult, QuizAttempt, QuizQuestion, UNANSWERED};
pub use quiz_history::{QuizHistoryEntry, QuizHistoryItem};
