use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::EnrichmentError;

/// Chat-completion boundary to the enrichment service (allows mocking).
pub trait LlmClient: Send + Sync {
    /// One blocking, non-streaming exchange. Returns the raw reply text.
    fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, EnrichmentError>;
}

/// Ollama HTTP client using `/api/chat`.
///
/// The underlying `reqwest` client pools connections and is safe to share
/// across worker threads.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EnrichmentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl LlmClient for OllamaClient {
    fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, EnrichmentError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                EnrichmentError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                EnrichmentError::Timeout(self.timeout)
            } else {
                EnrichmentError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EnrichmentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                EnrichmentError::Timeout(self.timeout)
            } else {
                EnrichmentError::MalformedPayload(e.to_string())
            }
        })?;

        let content = parsed.message.map(|m| m.content).unwrap_or_default();
        if content.trim().is_empty() {
            return Err(EnrichmentError::EmptyResponse);
        }
        Ok(content)
    }
}

type Responder = dyn Fn(&str) -> Result<String, EnrichmentError> + Send + Sync;

/// Mock LLM client for testing: scripted replies, optional latency.
pub struct MockLlmClient {
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    /// Always reply with `response`.
    pub fn new(response: &str) -> Self {
        let response = response.to_string();
        Self::with_responder(move |_| Ok(response.clone()))
    }

    /// Always fail with the error built by `make_error`.
    pub fn failing(make_error: fn() -> EnrichmentError) -> Self {
        Self::with_responder(move |_| Err(make_error()))
    }

    /// Reply computed from the user prompt.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, EnrichmentError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for MockLlmClient {
    fn chat(&self, _model: &str, _system: &str, user: &str) -> Result<String, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        (self.responder)(user)
    }
}
