use crate::error::{GenerationError, Result};
use crate::models::{
    Flashcard, Performance, QuestionResult, QuizAttempt, QuizQuestion, StudyRequest,
};
use crate::services::connectivity::ConnectivityProbe;
use crate::services::flashcard_parser::parse_response;
use crate::services::generation_service::GenerationClient;
use crate::services::grading_service::GradingService;
use crate::services::history_service::HistoryService;
use crate::services::prompt_service::build_prompt;
use crate::services::quiz_service::QuizService;
use crate::utils::time::now;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Tracks the generation currently running for each user so a newer request
/// can cancel the one it replaces.
#[derive(Debug, Default)]
pub struct InFlightGenerations {
    next_seq: AtomicU64,
    active: Mutex<HashMap<String, (u64, CancellationToken)>>,
}

/// Registration of one tracked generation. Dropping it unregisters the
/// generation unless a newer one for the same user has replaced it, so an
/// abandoned request never leaves a stale entry behind.
#[derive(Debug)]
pub struct GenerationTicket {
    registry: Arc<InFlightGenerations>,
    user_id: String,
    seq: u64,
    token: CancellationToken,
}

impl GenerationTicket {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for GenerationTicket {
    fn drop(&mut self) {
        if self.user_id.is_empty() {
            return;
        }
        let mut guard = self.registry.lock_active();
        if matches!(guard.get(&self.user_id), Some((seq, _)) if *seq == self.seq) {
            guard.remove(&self.user_id);
        }
    }
}

impl InFlightGenerations {
    /// Registers a generation for `user_id`, cancelling the previous one.
    /// Requests without a user id are not tracked.
    pub fn begin(self: &Arc<Self>, user_id: &str) -> GenerationTicket {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        if !user_id.is_empty() {
            let mut guard = self.lock_active();
            if let Some((_, previous)) = guard.insert(user_id.to_string(), (seq, token.clone())) {
                tracing::info!(user_id, "superseding in-flight generation");
                previous.cancel();
            }
        }

        GenerationTicket {
            registry: Arc::clone(self),
            user_id: user_id.to_string(),
            seq,
            token,
        }
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.lock_active().contains_key(user_id)
    }

    fn lock_active(&self) -> MutexGuard<'_, HashMap<String, (u64, CancellationToken)>> {
        self.active.lock().unwrap_or_else(|poisoned| {
            tracing::error!("in-flight generation map poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[derive(Debug, Clone)]
pub struct SubmittedQuiz {
    pub id: i64,
    pub attempt: QuizAttempt,
    pub results: Vec<QuestionResult>,
    pub percentage: u32,
    pub performance: Performance,
}

#[derive(Clone)]
pub struct StudyService {
    client: GenerationClient,
    connectivity: Arc<dyn ConnectivityProbe>,
    in_flight: Arc<InFlightGenerations>,
    history: HistoryService,
}

impl StudyService {
    pub fn new(
        client: GenerationClient,
        connectivity: Arc<dyn ConnectivityProbe>,
        history: HistoryService,
    ) -> Self {
        Self {
            client,
            connectivity,
            in_flight: Arc::new(InFlightGenerations::default()),
            history,
        }
    }

    pub fn in_flight(&self) -> &InFlightGenerations {
        &self.in_flight
    }

    /// Raw model output for a piece of study text. Blank content and a
    /// known-offline network both fail before any request is made.
    pub async fn generate(
        &self,
        content: &str,
        instruction: &str,
        network_available: bool,
    ) -> std::result::Result<String, GenerationError> {
        let Some(prompt) = build_prompt(content, instruction) else {
            return Err(GenerationError::EmptyResult);
        };
        if !network_available {
            return Err(GenerationError::NoConnectivity);
        }
        self.client.generate(&prompt).await
    }

    /// Full first stage of the pipeline: text in, flashcards out. A newer
    /// call for the same user cancels this one with `Cancelled`.
    pub async fn generate_flashcards(
        &self,
        user_id: &str,
        request: &StudyRequest,
    ) -> std::result::Result<Vec<Flashcard>, GenerationError> {
        if request.content.trim().is_empty() {
            return Err(GenerationError::EmptyResult);
        }
        if !self.connectivity.is_available().await {
            tracing::warn!(user_id, "skipping generation, model endpoint unreachable");
            return Err(GenerationError::NoConnectivity);
        }

        let ticket = self.in_flight.begin(user_id);
        let outcome = tokio::select! {
            biased;
            _ = ticket.token().cancelled() => Err(GenerationError::Cancelled),
            raw = self.generate(&request.content, request.instruction(), true) => raw,
        };
        drop(ticket);

        let raw = outcome?;
        let flashcards = parse_response(&raw);
        if flashcards.is_empty() {
            tracing::warn!(user_id, "model response produced no flashcards");
            return Err(GenerationError::EmptyResult);
        }

        tracing::info!(user_id, count = flashcards.len(), "flashcards generated");
        Ok(flashcards)
    }

    pub fn build_quiz<R: Rng + ?Sized>(&self, flashcards: &[Flashcard], rng: &mut R) -> Vec<QuizQuestion> {
        QuizService::build_quiz(flashcards, rng)
    }

    /// Scores a submission without storing it.
    pub fn score_quiz(
        user_id: &str,
        source_text: &str,
        questions: Vec<QuizQuestion>,
        answers: &[i32],
    ) -> (QuizAttempt, Vec<QuestionResult>) {
        let graded = GradingService::grade(&questions, answers);
        let user_answers = GradingService::normalize_answers(&questions, answers);
        let attempt = QuizAttempt {
            topics_label: QuizAttempt::topics_label(source_text),
            questions,
            user_answers,
            score: graded.score,
            total: graded.total,
            timestamp: now(),
            user_id: user_id.to_string(),
        };
        (attempt, graded.results)
    }

    /// Scores a submission and hands it to the history store.
    pub async fn submit_quiz(
        &self,
        user_id: &str,
        source_text: &str,
        questions: Vec<QuizQuestion>,
        answers: &[i32],
    ) -> Result<SubmittedQuiz> {
        let (attempt, results) = Self::score_quiz(user_id, source_text, questions, answers);
        let id = self.history.insert_attempt(&attempt).await?;
        let percentage = GradingService::percentage(attempt.score, attempt.total);

        Ok(SubmittedQuiz {
            id,
            attempt,
            results,
            percentage,
            performance: Performance::from_percentage(percentage),
        })
    }
}
