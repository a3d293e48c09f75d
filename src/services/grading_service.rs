use crate::models::{QuestionResult, QuizQuestion, UNANSWERED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedQuiz {
    pub results: Vec<QuestionResult>,
    pub score: i32,
    pub total: i32,
}

impl GradedQuiz {
    pub fn percentage(&self) -> u32 {
        GradingService::percentage(self.score, self.total)
    }
}

pub struct GradingService;

impl GradingService {
    /// Pads (or cuts) submitted answers to one slot per question; missing
    /// slots are `UNANSWERED`.
    pub fn normalize_answers(questions: &[QuizQuestion], answers: &[i32]) -> Vec<i32> {
        (0..questions.len())
            .map(|idx| answers.get(idx).copied().unwrap_or(UNANSWERED))
            .collect()
    }

    /// A question counts as correct only when an option was selected and its
    /// index equals the correct index.
    pub fn grade(questions: &[QuizQuestion], answers: &[i32]) -> GradedQuiz {
        let answers = Self::normalize_answers(questions, answers);
        let mut score = 0;
        let mut results = Vec::with_capacity(questions.len());

        for (q, &selected) in questions.iter().zip(answers.iter()) {
            let is_correct = selected != UNANSWERED && selected == q.correct_answer_index;
            if is_correct {
                score += 1;
            }
            results.push(QuestionResult {
                question: q.question.clone(),
                options: q.options.clone(),
                correct_answer_index: q.correct_answer_index,
                user_answer_index: selected,
                is_correct,
            });
        }

        GradedQuiz {
            results,
            score,
            total: questions.len() as i32,
        }
    }

    /// `round(score / total * 100)`, zero for an empty quiz.
    pub fn percentage(score: i32, total: i32) -> u32 {
        if total <= 0 {
            return 0;
        }
        (f64::from(score) / f64::from(total) * 100.0).round().max(0.0) as u32
    }
}
