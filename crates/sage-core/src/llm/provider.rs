//! LlmProvider trait definition.
//!
//! This is the uniform request/response contract both backends implement.

use sage_types::llm::{BackendError, CompletionRequest};

/// Trait for model backends (cloud completion API, local inference daemon).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Backends hide
/// their request shapes and error types behind this contract: a request goes
/// in, the reply text or a [`BackendError`] comes out. No retries.
///
/// Implementations live in sage-infra.
pub trait LlmProvider: Send + Sync {
    /// Human-readable backend name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a completion request and return the reply text.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<String, BackendError>> + Send;
}
