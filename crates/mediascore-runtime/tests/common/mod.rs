//! Shared fixtures for runtime integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mediascore_runtime::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

/// How the stub answers one request shape.
#[derive(Debug, Clone)]
pub enum Reply {
    Content(String),
    Network,
}

impl Reply {
    pub fn score(score: i64) -> Self {
        Reply::Content(format!(r#"{{"score": {}, "rationale": "stub"}}"#, score))
    }

    pub fn raw(content: &str) -> Self {
        Reply::Content(content.to_string())
    }
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub task: String,
    pub vision: bool,
}

/// Provider stub with separate vision/text replies and call recording.
pub struct StubProvider {
    vision: Reply,
    text: Reply,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
    vision_calls: AtomicUsize,
    text_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(vision: Reply, text: Reply) -> Self {
        Self {
            vision,
            text,
            delay: None,
            calls: Mutex::new(Vec::new()),
            vision_calls: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::new(Reply::Network, Reply::Network)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn vision_calls(&self) -> usize {
        self.vision_calls.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, task: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.task == task).collect()
    }
}

fn task_of(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.role == "user")
        .find_map(|m| serde_json::from_str::<serde_json::Value>(&m.content).ok())
        .and_then(|v| v["task"].as_str().map(str::to_string))
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let vision = messages.iter().any(|m| m.image.is_some());
        let counter = if vision {
            &self.vision_calls
        } else {
            &self.text_calls
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call {
            task: task_of(&messages),
            vision,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match if vision { &self.vision } else { &self.text } {
            Reply::Content(content) => Ok(CompletionResponse {
                content: content.clone(),
                usage: TokenUsage {
                    prompt_tokens: 50,
                    completion_tokens: 10,
                },
                model: "stub".to_string(),
                stop_reason: Some("stop".to_string()),
            }),
            Reply::Network => Err(ProviderError::HttpError("connection refused".to_string())),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// PNG bytes of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
