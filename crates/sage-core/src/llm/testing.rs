//! Scripted provider for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sage_types::llm::{BackendError, CompletionRequest};

use super::box_provider::BoxLlmProvider;
use super::provider::LlmProvider;

/// Replays queued replies in order and records every request it receives.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    /// Build a boxed provider plus a handle to its request log.
    pub fn boxed(
        replies: Vec<Result<String, BackendError>>,
    ) -> (BoxLlmProvider, Arc<Mutex<Vec<CompletionRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let provider = Self {
            replies: Mutex::new(replies.into()),
            requests: Arc::clone(&requests),
        };
        (BoxLlmProvider::new(provider), requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::provider("no scripted reply left")))
    }
}
