use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);
pub const CALL_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub candidate_count: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            candidate_count: 1,
            max_output_tokens: 2048,
        }
    }
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connection(String),
}

/// One call is one HTTP attempt against the model endpoint. Retrying is the
/// caller's business.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn send(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<ModelResponse, TransportError>;
}

#[derive(Clone)]
pub struct GeminiTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    read_timeout: Duration,
}

impl GeminiTransport {
    pub fn new(client: Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            read_timeout: READ_TIMEOUT,
        }
    }

    /// HTTP client with the connect and whole-call bounds of the model
    /// endpoint. The read bound is applied per response in `send`.
    pub fn build_client() -> reqwest::Result<Client> {
        Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(CALL_TIMEOUT)
            .build()
    }
}

#[async_trait]
impl ModelTransport for GeminiTransport {
    async fn send(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<ModelResponse, TransportError> {
        let res = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = res.status().as_u16();
        let body = tokio::time::timeout(self.read_timeout, res.text())
            .await
            .map_err(|_| {
                TransportError::Timeout(format!(
                    "response body not read within {}s",
                    self.read_timeout.as_secs()
                ))
            })?
            .map_err(classify)?;

        Ok(ModelResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Connection(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Wait before attempt `attempt + 1`: `base_delay * attempt^2`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt.saturating_mul(attempt)
    }
}

#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn ModelTransport>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(transport: Arc<dyn ModelTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends `prompt` to the model and returns the raw response body.
    ///
    /// Timeouts, connection failures and 5xx responses are retried up to the
    /// policy's attempt budget with quadratic backoff. Any other non-success
    /// status is terminal on first sight.
    pub async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = GenerationError::TransportFailure("no attempt made".to_string());

        for attempt in 1..=max_attempts {
            tracing::debug!(attempt, "sending generation request");

            let failure = match self.transport.send(&request).await {
                Ok(resp) if (200..300).contains(&resp.status) => {
                    tracing::info!(attempt, bytes = resp.body.len(), "generation request succeeded");
                    return Ok(resp.body);
                }
                Ok(resp) if (500..600).contains(&resp.status) => {
                    GenerationError::ServerError { status: resp.status }
                }
                Ok(resp) => {
                    tracing::warn!(
                        attempt,
                        status = resp.status,
                        body = %preview(&resp.body),
                        "model endpoint rejected request"
                    );
                    GenerationError::ClientError { status: resp.status }
                }
                Err(TransportError::Timeout(msg)) => GenerationError::Timeout(msg),
                Err(TransportError::Connection(msg)) => GenerationError::TransportFailure(msg),
            };

            if !failure.is_retryable() {
                tracing::warn!(attempt, error = %failure, "generation failed, not retrying");
                return Err(failure);
            }

            tracing::warn!(attempt, error = %failure, "generation attempt failed");
            last_error = failure;

            if attempt < max_attempts {
                let delay = self.policy.delay_after(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(attempts = max_attempts, error = %last_error, "all generation attempts failed");
        Err(last_error)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
