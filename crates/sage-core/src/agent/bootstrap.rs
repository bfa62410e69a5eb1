//! Session bootstrap.
//!
//! Load the previous conversation, digest it into a summary when it holds
//! anything beyond the priming block, build a fresh primed conversation, and
//! optionally ask for a greeting. No failure here aborts startup: a bad
//! record, a failed summary, or a failed greeting each degrade to "without".

use sage_types::config::Options;
use sage_types::conversation::Conversation;
use sage_types::error::PersistenceError;
use sage_types::llm::BackendError;

use crate::repository::conversation::ConversationStore;

use super::engine::AgentEngine;
use super::summarizer::ConversationSummarizer;

/// Everything the session needs to start, plus the recoverable failures
/// the front end should report.
#[derive(Debug)]
pub struct BootstrapOutcome {
    pub conversation: Conversation,
    pub summary: Option<String>,
    pub greeting: Option<String>,
    pub load_error: Option<PersistenceError>,
    pub greeting_error: Option<BackendError>,
}

/// Drives the startup sequence against a store and an engine.
pub struct SessionBootstrapper<'a, S: ConversationStore> {
    store: &'a S,
    engine: &'a AgentEngine,
}

impl<'a, S: ConversationStore> SessionBootstrapper<'a, S> {
    pub fn new(store: &'a S, engine: &'a AgentEngine) -> Self {
        Self { store, engine }
    }

    #[tracing::instrument(name = "bootstrap", skip_all, fields(greet = greet))]
    pub async fn run(
        &self,
        options: &Options,
        system_prompt: &str,
        system_snapshot: &str,
        greet: bool,
    ) -> BootstrapOutcome {
        let (previous, load_error) = match self.store.load().await {
            Ok(conversation) => (conversation, None),
            Err(e) => {
                tracing::warn!(error = %e, "starting with an empty conversation");
                (Conversation::new(), Some(e))
            }
        };

        let summary = if previous.is_substantial() {
            ConversationSummarizer::summarize(self.engine.provider(), &previous, options).await
        } else {
            None
        };
        tracing::debug!(
            previous_len = previous.len(),
            summarized = summary.is_some(),
            "previous session processed"
        );

        let mut conversation = Conversation::primed(system_prompt, system_snapshot, summary.as_deref());

        let mut greeting = None;
        let mut greeting_error = None;
        if greet {
            match self
                .engine
                .greet(&conversation, options, summary.is_some())
                .await
            {
                Ok(text) => {
                    conversation.push_assistant(text.clone());
                    greeting = Some(text);
                }
                Err(e) => greeting_error = Some(e),
            }
        }

        BootstrapOutcome {
            conversation,
            summary,
            greeting,
            load_error,
            greeting_error,
        }
    }
}
