use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure kinds of the flashcard generation pipeline. Every failure the
/// pipeline reports to a caller is one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("no network connectivity")]
    NoConnectivity,

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("model endpoint rejected the request with status {status}")]
    ClientError { status: u16 },

    #[error("model endpoint failed with status {status}")]
    ServerError { status: u16 },

    #[error("no flashcards could be produced")]
    EmptyResult,

    #[error("superseded by a newer generation request")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Connectivity,
    Timeout,
    ServiceUnavailable,
    Generic,
    NoContent,
    Cancelled,
}

impl GenerationError {
    pub fn category(&self) -> FailureCategory {
        match self {
            GenerationError::NoConnectivity | GenerationError::TransportFailure(_) => {
                FailureCategory::Connectivity
            }
            GenerationError::Timeout(_) => FailureCategory::Timeout,
            GenerationError::ServerError { .. } => FailureCategory::ServiceUnavailable,
            GenerationError::ClientError { .. } => FailureCategory::Generic,
            GenerationError::EmptyResult => FailureCategory::NoContent,
            GenerationError::Cancelled => FailureCategory::Cancelled,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::NoConnectivity => {
                "No internet connection. Please check your network and try again."
            }
            GenerationError::Timeout(_) => {
                "Request timed out. Please check your internet connection and try again."
            }
            GenerationError::TransportFailure(_) => {
                "Cannot connect to AI service. Please check your internet connection."
            }
            GenerationError::ServerError { .. } => {
                "AI service is temporarily unavailable. Please try again in a moment."
            }
            GenerationError::ClientError { .. } => {
                "Failed to generate flashcards. Please try again."
            }
            GenerationError::EmptyResult => {
                "No flashcards could be generated from the provided text. Please try with different content."
            }
            GenerationError::Cancelled => {
                "This request was replaced by a newer generation request."
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerationError::NoConnectivity => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GenerationError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
            GenerationError::ServerError { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::ClientError { .. } => StatusCode::BAD_GATEWAY,
            GenerationError::EmptyResult => StatusCode::UNPROCESSABLE_ENTITY,
            GenerationError::Cancelled => StatusCode::CONFLICT,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Timeout(_)
                | GenerationError::TransportFailure(_)
                | GenerationError::ServerError { .. }
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        if let Error::Generation(err) = &self {
            let body = Json(json!({
                "error": err.user_message(),
                "category": err.category(),
            }));
            return (err.status_code(), body).into_response();
        }

        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
