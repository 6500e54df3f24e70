//! Model scoring client.
//!
//! Sends one scoring request (text-only or text + image) through an
//! [`LlmProvider`] and decodes the reply into a [`CriterionScore`]. Every call
//! runs under a local deadline in addition to the transport timeout; when
//! the deadline fires the in-flight request is dropped.

mod decode;

pub use decode::ScoreReply;

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tokio::time::Instant;

use mediascore_core::{CriterionScore, ScoreSource};

use crate::prompts;
use crate::providers::{ChatMessage, CompletionConfig, InlineImage, LlmProvider, ProviderError};

/// Errors from a single scoring call.
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Missing credential or unusable provider setup. Never retried.
    #[error("Scoring not configured: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Scoring timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unparseable score reply: {0}")]
    Parse(String),
}

/// Error category, without the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringErrorKind {
    Config,
    Network,
    Timeout,
    Parse,
}

impl ScoringError {
    pub fn kind(&self) -> ScoringErrorKind {
        match self {
            ScoringError::Config(_) => ScoringErrorKind::Config,
            ScoringError::Network(_) => ScoringErrorKind::Network,
            ScoringError::Timeout(_) => ScoringErrorKind::Timeout,
            ScoringError::Parse(_) => ScoringErrorKind::Parse,
        }
    }

    /// Only transport failures are worth another attempt within one step.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::Network(_))
    }
}

impl From<ProviderError> for ScoringError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => ScoringError::Config(msg),
            ProviderError::AuthError => ScoringError::Config(err.to_string()),
            ProviderError::HttpError(_)
            | ProviderError::ApiError { .. }
            | ProviderError::RateLimited { .. } => ScoringError::Network(err.to_string()),
            ProviderError::Timeout(d) => ScoringError::Timeout(d),
            ProviderError::ParseError(msg) => ScoringError::Parse(msg),
        }
    }
}

/// One scoring request, built per strategy attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRequest {
    /// Stable task identifier, e.g. `subject_adherence`
    pub task_name: String,

    /// What the model should judge
    pub criteria_text: String,

    /// Structured context sent alongside the criteria
    pub structured_input: Map<String, JsonValue>,

    /// Inline image for vision requests
    pub image_payload: Option<InlineImage>,
}

impl ScoringRequest {
    /// Create a text-only request with empty input.
    pub fn new(task_name: impl Into<String>, criteria_text: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            criteria_text: criteria_text.into(),
            structured_input: Map::new(),
            image_payload: None,
        }
    }

    /// Add one structured input field.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.structured_input.insert(key.into(), value.into());
        self
    }

    /// Attach an inline image, turning this into a vision request.
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image_payload = Some(image);
        self
    }

    pub fn is_vision(&self) -> bool {
        self.image_payload.is_some()
    }

    /// The `{task, criteria, input}` envelope sent as the user message.
    pub fn envelope(&self) -> JsonValue {
        serde_json::json!({
            "task": self.task_name,
            "criteria": self.criteria_text,
            "input": self.structured_input,
        })
    }

    /// Chat messages for this request.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let system = ChatMessage::system(prompts::system_prompt(self.is_vision()));
        let body = self.envelope().to_string();
        let user = match &self.image_payload {
            Some(image) => ChatMessage::user_with_image(body, image.clone()),
            None => ChatMessage::user(body),
        };
        vec![system, user]
    }
}

/// Per-call limits supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    pub timeout: Duration,
    pub retries: usize,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1500),
            retries: 0,
        }
    }
}

/// Scoring client over a chat-completion provider.
#[derive(Clone)]
pub struct ModelScoringClient {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl std::fmt::Debug for ModelScoringClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelScoringClient")
            .field("provider", &self.provider.name())
            .field("model", &self.completion.model)
            .finish()
    }
}

impl ModelScoringClient {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            completion: CompletionConfig::default(),
        }
    }

    /// Override model, token limit and response format.
    pub fn with_completion_config(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    /// Whether the provider reports itself ready to serve requests.
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await
    }

    /// Score a request with a timeout measured from now.
    pub async fn score(
        &self,
        request: &ScoringRequest,
        options: CallOptions,
    ) -> Result<CriterionScore, ScoringError> {
        self.score_until(request, options.retries, Instant::now() + options.timeout)
            .await
    }

    /// Score a request that must finish before `deadline`.
    ///
    /// Retries cover transport errors only and share the same deadline.
    pub async fn score_until(
        &self,
        request: &ScoringRequest,
        retries: usize,
        deadline: Instant,
    ) -> Result<CriterionScore, ScoringError> {
        let budget = deadline.saturating_duration_since(Instant::now());
        if budget.is_zero() {
            return Err(ScoringError::Timeout(budget));
        }

        let messages = request.to_messages();
        let config = CompletionConfig {
            timeout: budget,
            ..self.completion.clone()
        };

        let provider = &self.provider;
        let messages = &messages;
        let config = &config;
        let task = request.task_name.as_str();

        let attempt = || async move {
            tracing::debug!(task, provider = provider.name(), "Sending scoring request");
            let response = provider.complete(messages.clone(), config).await?;
            tracing::debug!(
                task,
                model = %response.model,
                tokens = response.usage.total(),
                "Scoring reply received"
            );
            ScoreReply::decode(&response.content)
        };

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(1))
            .with_max_times(retries);

        let reply = tokio::time::timeout_at(
            deadline,
            attempt
                .retry(backoff)
                .when(ScoringError::is_retryable)
                .notify(|err, delay| {
                    tracing::debug!(task, error = %err, delay = ?delay, "Retrying scoring request");
                }),
        )
        .await
        .map_err(|_| ScoringError::Timeout(budget))??;

        let source = if request.is_vision() {
            ScoreSource::Vision
        } else {
            ScoreSource::Text
        };

        let mut score = CriterionScore::new(reply.score, source);
        score.rationale = reply.rationale;
        Ok(score)
    }
}
