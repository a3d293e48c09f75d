//! Turns a raw model response into flashcards.
//!
//! The generated text is first read as the requested JSON document. When
//! that fails the text is scanned line by line for `Q:`/`A:` style pairs.
//! Nothing in here returns an error: unusable input yields an empty list.

use crate::models::Flashcard;
use crate::utils::text::strip_prefix_ignore_case;
use serde::Deserialize;
use serde_json::Value as JsonValue;

const QUESTION_PREFIXES: [&str; 2] = ["Question:", "Q:"];
const ANSWER_PREFIXES: [&str; 2] = ["Answer:", "A:"];

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Parses a full provider response body.
pub fn parse_response(raw: &str) -> Vec<Flashcard> {
    match extract_generated_text(raw) {
        Some(text) => parse_generated_text(&text),
        None => {
            tracing::warn!("model response carried no generated text");
            Vec::new()
        }
    }
}

/// `candidates[0].content.parts[0].text` of the provider envelope.
pub fn extract_generated_text(raw: &str) -> Option<String> {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "model response is not a valid envelope");
            return None;
        }
    };

    envelope
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

/// Parses the text the model generated, structured first, heuristic second.
pub fn parse_generated_text(text: &str) -> Vec<Flashcard> {
    match parse_structured(text) {
        Some(cards) => {
            tracing::debug!(count = cards.len(), "parsed flashcards from JSON");
            cards
        }
        None => {
            let cards = parse_lines(text);
            tracing::debug!(count = cards.len(), "parsed flashcards from Q/A lines");
            cards
        }
    }
}

/// Removes a surrounding Markdown code fence (```json ... ``` or ``` ... ```).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// `None` when the text is not a JSON object with a `flashcards` array.
/// Elements missing either field, or with a blank one, are dropped.
pub fn parse_structured(text: &str) -> Option<Vec<Flashcard>> {
    let value: JsonValue = serde_json::from_str(strip_code_fence(text)).ok()?;
    let entries = value.get("flashcards")?.as_array()?;

    let cards = entries
        .iter()
        .filter_map(|entry| {
            let question = entry.get("question")?.as_str()?;
            let answer = entry.get("answer")?.as_str()?;
            Flashcard::new(question, answer)
        })
        .collect();
    Some(cards)
}

#[derive(Default)]
struct LineScanner {
    question: String,
    answer: String,
    in_answer: bool,
    cards: Vec<Flashcard>,
}

impl LineScanner {
    fn flush(&mut self) {
        if let Some(card) = Flashcard::new(&self.question, &self.answer) {
            self.cards.push(card);
        }
    }

    fn feed(&mut self, line: &str) {
        if let Some(rest) = strip_any_prefix(line, &QUESTION_PREFIXES) {
            self.flush();
            self.question = rest.trim().to_string();
            self.answer.clear();
            self.in_answer = false;
        } else if let Some(rest) = strip_any_prefix(line, &ANSWER_PREFIXES) {
            self.answer = rest.trim().to_string();
            self.in_answer = true;
        } else if self.in_answer && !self.answer.is_empty() {
            self.answer.push(' ');
            self.answer.push_str(line);
        } else if !self.question.is_empty() && self.answer.is_empty() {
            self.answer = line.to_string();
            self.in_answer = true;
        }
    }

    fn finish(mut self) -> Vec<Flashcard> {
        self.flush();
        self.cards
    }
}

/// Line-oriented fallback for `Q:`/`Question:` and `A:`/`Answer:` text.
pub fn parse_lines(text: &str) -> Vec<Flashcard> {
    let mut scanner = LineScanner::default();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        scanner.feed(line);
    }
    scanner.finish()
}

fn strip_any_prefix<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes
        .iter()
        .find_map(|prefix| strip_prefix_ignore_case(line, prefix))
}
