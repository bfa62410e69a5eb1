//! Runtime-selected backend.
//!
//! `LlmProvider` uses return-position `impl Future`, which is not object
//! safe. `ErasedProvider` boxes the future so either backend can sit behind
//! one `BoxLlmProvider`.

use std::future::Future;
use std::pin::Pin;

use sage_types::llm::{BackendError, CompletionRequest};

use super::provider::LlmProvider;

pub trait ErasedProvider: Send + Sync {
    fn name(&self) -> &str;

    fn complete_erased<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>>;
}

impl<T: LlmProvider> ErasedProvider for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn complete_erased<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased backend, selected at runtime from the current options.
pub struct BoxLlmProvider {
    inner: Box<dyn ErasedProvider + Send + Sync>,
}

impl BoxLlmProvider {
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send a completion request and return the reply text.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.inner.complete_erased(request).await
    }
}
