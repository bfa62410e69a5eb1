//! Message and backend request/response types for Sage.
//!
//! These types model the data shapes exchanged with a model backend:
//! conversation messages, completion requests, optional image attachments,
//! and the backend error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Capitalized label used when a transcript is flattened into prose
    /// (e.g. `"User: ..."`).
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::System => "System",
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

/// A single message in a conversation.
///
/// Messages are immutable once created; a conversation only ever appends
/// new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }
}

/// An image attached to the final user message of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`.
    pub media_type: String,
    /// Base64-encoded image bytes (no data-URL prefix).
    pub data_base64: String,
}

impl ImageAttachment {
    /// Render as a `data:` URL for backends that take image URLs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data_base64)
    }
}

/// Request to a model backend for a single completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    /// Attached to the last user message when present.
    pub image: Option<ImageAttachment>,
}

/// Category of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Non-2xx response or SDK-level failure.
    ProviderError,
    /// The local inference daemon is not listening.
    ConnectionRefused,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The backend rejected or lacked credentials.
    AuthenticationFailed,
    /// The backend answered, but the reply text could not be found.
    InvalidResponse,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendErrorKind::ProviderError => write!(f, "provider error"),
            BackendErrorKind::ConnectionRefused => write!(f, "connection refused"),
            BackendErrorKind::Timeout => write!(f, "timed out"),
            BackendErrorKind::AuthenticationFailed => write!(f, "authentication failed"),
            BackendErrorKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// Error from a model backend call.
///
/// `detail` never carries credential material.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub detail: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn provider(detail: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ProviderError, detail)
    }

    pub fn is_connection_refused(&self) -> bool {
        self.kind == BackendErrorKind::ConnectionRefused
    }
}
