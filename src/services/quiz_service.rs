use crate::models::{Flashcard, QuizQuestion};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

pub const MIN_FLASHCARDS: usize = 4;
pub const MAX_QUESTIONS: usize = 10;
pub const DISTRACTORS_PER_QUESTION: usize = 3;

pub struct QuizService;

impl QuizService {
    /// Builds a multiple-choice quiz from a flashcard set.
    ///
    /// Up to ten cards are sampled after a shuffle. Each becomes a question
    /// whose wrong options are other answers from the whole set. A card with
    /// fewer than three distinct alternative answers is left out, so every
    /// question has exactly four distinct options. Cards with a blank side
    /// are ignored, and fewer than four remaining cards give an empty quiz.
    pub fn build_quiz<R: Rng + ?Sized>(flashcards: &[Flashcard], rng: &mut R) -> Vec<QuizQuestion> {
        let usable: Vec<&Flashcard> = flashcards
            .iter()
            .filter(|card| !card.question.trim().is_empty() && !card.answer.trim().is_empty())
            .collect();
        if usable.len() < MIN_FLASHCARDS {
            tracing::debug!(count = usable.len(), "not enough flashcards for a quiz");
            return Vec::new();
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(usable.len());
        let mut all_answers: Vec<&str> = Vec::with_capacity(usable.len());
        for card in usable.iter().copied() {
            if seen.insert(card.answer.as_str()) {
                all_answers.push(card.answer.as_str());
            }
        }

        let mut sample = usable;
        sample.shuffle(rng);
        sample.truncate(MAX_QUESTIONS);

        sample
            .into_iter()
            .filter_map(|card| {
                let question = Self::build_question(card, &all_answers, rng);
                if question.is_none() {
                    tracing::warn!(
                        question = %card.question,
                        "skipping quiz question without enough distinct distractors"
                    );
                }
                question
            })
            .collect()
    }

    fn build_question<R: Rng + ?Sized>(
        card: &Flashcard,
        all_answers: &[&str],
        rng: &mut R,
    ) -> Option<QuizQuestion> {
        let correct = card.answer.as_str();
        let mut distractors: Vec<&str> = all_answers
            .iter()
            .copied()
            .filter(|answer| *answer != correct)
            .collect();
        if distractors.len() < DISTRACTORS_PER_QUESTION {
            return None;
        }
        distractors.shuffle(rng);
        distractors.truncate(DISTRACTORS_PER_QUESTION);

        let mut options: Vec<String> = std::iter::once(correct)
            .chain(distractors)
            .map(str::to_string)
            .collect();
        options.shuffle(rng);
        let correct_answer_index = options.iter().position(|o| o == correct)? as i32;

        Some(QuizQuestion {
            question: card.question.clone(),
            options,
            correct_answer_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cards(n: usize) -> Vec<Flashcard> {
        (1..=n)
            .map(|i| Flashcard::new(&format!("Q{}", i), &format!("A{}", i)).unwrap())
            .collect()
    }

    fn assert_well_formed(question: &QuizQuestion, source: &[Flashcard]) {
        let card = source
            .iter()
            .find(|c| c.question == question.question)
            .expect("question comes from a flashcard");
        assert_eq!(question.options.len(), 4);
        assert_eq!(
            question.options.iter().filter(|o| **o == card.answer).count(),
            1
        );
        assert_eq!(question.correct_answer(), Some(card.answer.as_str()));

        let mut distinct = question.options.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn fewer_than_four_cards_give_empty_quiz() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in 0..4 {
            assert!(QuizService::build_quiz(&cards(n), &mut rng).is_empty());
        }
    }

    #[test]
    fn four_cards_give_four_well_formed_questions() {
        let source = cards(4);
        let mut rng = StdRng::seed_from_u64(7);
        let quiz = QuizService::build_quiz(&source, &mut rng);
        assert_eq!(quiz.len(), 4);
        for question in &quiz {
            assert_well_formed(question, &source);
        }
    }

    #[test]
    fn sample_is_capped_at_ten_distinct_cards() {
        let source = cards(25);
        let mut rng = StdRng::seed_from_u64(42);
        let quiz = QuizService::build_quiz(&source, &mut rng);
        assert_eq!(quiz.len(), MAX_QUESTIONS);

        let mut asked: Vec<&str> = quiz.iter().map(|q| q.question.as_str()).collect();
        asked.sort();
        asked.dedup();
        assert_eq!(asked.len(), MAX_QUESTIONS);
        for question in &quiz {
            assert_well_formed(question, &source);
        }
    }

    #[test]
    fn same_seed_gives_same_quiz() {
        let source = cards(12);
        let a = QuizService::build_quiz(&source, &mut StdRng::seed_from_u64(99));
        let b = QuizService::build_quiz(&source, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn questions_without_three_distinct_distractors_are_skipped() {
        let source = vec![
            Flashcard::new("Q1", "Same").unwrap(),
            Flashcard::new("Q2", "Same").unwrap(),
            Flashcard::new("Q3", "Same").unwrap(),
            Flashcard::new("Q4", "Other").unwrap(),
            Flashcard::new("Q5", "Third").unwrap(),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let quiz = QuizService::build_quiz(&source, &mut rng);
        assert!(quiz.is_empty());

        let mut with_enough = source.clone();
        with_enough.push(Flashcard::new("Q6", "Fourth").unwrap());
        let quiz = QuizService::build_quiz(&with_enough, &mut rng);
        assert_eq!(quiz.len(), 6);
        for question in &quiz {
            assert_well_formed(question, &with_enough);
        }
    }

    #[test]
    fn blank_cards_never_become_questions_or_distractors() {
        let mut source = cards(4);
        source.push(Flashcard {
            question: String::new(),
            answer: "  ".into(),
        });
        let quiz = QuizService::build_quiz(&source, &mut StdRng::seed_from_u64(11));
        assert_eq!(quiz.len(), 4);
        for question in &quiz {
            assert!(!question.question.is_empty());
            assert!(question.options.iter().all(|o| !o.trim().is_empty()));
        }

        let mut too_few = cards(3);
        too_few.push(Flashcard {
            question: "Q4".into(),
            answer: String::new(),
        });
        assert!(QuizService::build_quiz(&too_few, &mut StdRng::seed_from_u64(11)).is_empty());
    }
}
