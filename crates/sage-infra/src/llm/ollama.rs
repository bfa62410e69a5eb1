//! Local Ollama backend.
//!
//! POSTs `{model, messages, stream: false, options}` to the daemon's chat
//! endpoint and reads the reply from `message.content`. System messages are
//! not forwarded; the local models are driven by user and assistant turns
//! only.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use sage_core::llm::provider::LlmProvider;
use sage_types::llm::{BackendError, BackendErrorKind, CompletionRequest, MessageRole};

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: MessageRole,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<&'a str>>,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Client for the local inference daemon.
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
}

impl OllamaProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    fn build_body<'a>(&self, request: &'a CompletionRequest) -> ChatBody<'a> {
        let mut messages: Vec<ChatMessage<'a>> = request
            .messages
            .iter()
            .filter(|m| !m.is_system())
            .map(|m| ChatMessage {
                role: m.role,
                content: &m.content,
                images: None,
            })
            .collect();

        if let Some(image) = &request.image {
            if let Some(last_user) = messages
                .iter_mut()
                .rev()
                .find(|m| m.role == MessageRole::User)
            {
                last_user.images = Some(vec![image.data_base64.as_str()]);
            }
        }

        ChatBody {
            model: &request.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> BackendError {
        match send_error_kind(err.is_timeout(), err.is_connect()) {
            BackendErrorKind::ConnectionRefused => BackendError::new(
                BackendErrorKind::ConnectionRefused,
                format!(
                    "cannot reach Ollama at {}; make sure 'ollama serve' is running",
                    self.url
                ),
            ),
            kind => BackendError::new(kind, err.to_string()),
        }
    }
}

/// A connect that timed out is a timeout, not a refusal.
fn send_error_kind(timed_out: bool, connect_failed: bool) -> BackendErrorKind {
    if timed_out {
        BackendErrorKind::Timeout
    } else if connect_failed {
        BackendErrorKind::ConnectionRefused
    } else {
        BackendErrorKind::ProviderError
    }
}

impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let body = self.build_body(request);
        tracing::debug!(url = %self.url, messages = body.messages.len(), "sending Ollama chat request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::provider(format!("HTTP {status}: {text}")));
        }

        let reply: ChatReply = response.json().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::new(BackendErrorKind::Timeout, e.to_string())
            } else {
                BackendError::new(BackendErrorKind::InvalidResponse, e.to_string())
            }
        })?;

        reply.message.map(|m| m.content).ok_or_else(|| {
            BackendError::new(BackendErrorKind::InvalidResponse, "reply has no message content")
        })
    }
}
