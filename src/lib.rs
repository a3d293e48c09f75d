pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::middleware::rate_limit::{per_user_rps_middleware, RateLimiter};
use crate::services::{
    connectivity::{ConnectivityProbe, HostProbe},
    generation_service::{GeminiTransport, GenerationClient, ModelTransport, RetryPolicy},
    history_service::HistoryService,
    study_service::StudyService,
};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub history_service: HistoryService,
    pub study_service: StudyService,
}

impl AppState {
    /// Wires the production collaborators: the Gemini transport and a TCP
    /// probe against the same endpoint.
    pub fn new(pool: SqlitePool, config: &Config) -> Result<Self> {
        let http_client = GeminiTransport::build_client()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let transport = GeminiTransport::new(
            http_client,
            config.gemini_endpoint.clone(),
            config.gemini_api_key.clone(),
        );
        let probe = HostProbe::for_endpoint(&config.gemini_endpoint)?;

        Ok(Self::with_collaborators(
            pool,
            Arc::new(transport),
            Arc::new(probe),
            RetryPolicy::default(),
        ))
    }

    pub fn with_collaborators(
        pool: SqlitePool,
        transport: Arc<dyn ModelTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
        policy: RetryPolicy,
    ) -> Self {
        let history_service = HistoryService::new(pool.clone());
        let study_service = StudyService::new(
            GenerationClient::new(transport, policy),
            connectivity,
            history_service.clone(),
        );

        Self {
            pool,
            history_service,
            study_service,
        }
    }
}

pub fn build_router(state: AppState, generation_rps: u32) -> Router {
    let generation_api = Router::new()
        .route(
            "/api/flashcards/generate",
            post(routes::flashcards::generate_flashcards),
        )
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(generation_rps),
            per_user_rps_middleware,
        ));

    let study_api = Router::new()
        .route("/api/quizzes", post(routes::quiz::build_quiz))
        .route("/api/quizzes/submit", post(routes::quiz::submit_quiz))
        .route(
            "/api/history",
            get(routes::history::list_history).delete(routes::history::clear_history),
        )
        .route(
            "/api/history/:id",
            get(routes::history::get_history_entry).delete(routes::history::delete_history_entry),
        );

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(generation_api)
        .merge(study_api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
