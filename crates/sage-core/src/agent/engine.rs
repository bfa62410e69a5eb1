//! Agent execution engine for Sage.
//!
//! AgentEngine builds completion requests from the conversation and current
//! options and sends them through the selected backend. Every outbound turn
//! goes through the context window; the canonical conversation only grows
//! once the backend has answered.

use tracing::{Instrument, info_span};

use sage_types::config::Options;
use sage_types::conversation::Conversation;
use sage_types::llm::{BackendError, CompletionRequest, ImageAttachment, Message};

use crate::conversation::window::{self, WindowSelection};
use crate::llm::box_provider::BoxLlmProvider;

/// Greeting regime temperature.
pub const GREETING_TEMPERATURE: f64 = 1.0;

const GREETING_QUERY: &str = "Greet the user as Sage, a wise advisor for their system. \
Briefly mention your capabilities and their system information then invite them to seek your counsel.";

const GREETING_QUERY_WITH_SUMMARY: &str = "Greet the user as Sage, a wise advisor for their system. \
Briefly mention your capabilities, their system information, and acknowledge the previous \
conversation summary. Then invite them to continue seeking your counsel.";

/// Marker recorded in place of an image in the conversation.
pub const IMAGE_REQUEST_PREFIX: &str = "[Image analysis request] ";

/// A user turn that has been windowed but not yet answered.
///
/// Nothing is appended to the conversation until [`PendingTurn::commit`]
/// is called with the assistant's reply, so a failed backend call abandons
/// the turn without leaving a dangling user message.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    user_message: Message,
    pub window: WindowSelection,
}

impl PendingTurn {
    pub fn new(conversation: &Conversation, user_text: &str, context_window_size: usize) -> Self {
        let user_message = Message::user(user_text);
        let mut candidate = conversation.clone();
        candidate.push(user_message.clone());
        let window = window::select(&candidate, context_window_size);
        Self {
            user_message,
            window,
        }
    }

    /// Append the user message and the assistant reply.
    pub fn commit(self, conversation: &mut Conversation, reply: &str) {
        conversation.push(self.user_message);
        conversation.push_assistant(reply);
    }
}

/// Executes backend calls on behalf of the session.
pub struct AgentEngine {
    provider: BoxLlmProvider,
}

impl AgentEngine {
    pub fn new(provider: BoxLlmProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &BoxLlmProvider {
        &self.provider
    }

    /// Send a windowed user turn and return the assistant's reply.
    pub async fn execute(
        &self,
        turn: &PendingTurn,
        options: &Options,
    ) -> Result<String, BackendError> {
        let request = CompletionRequest {
            model: options.model.clone(),
            messages: turn.window.messages.clone(),
            max_tokens: options.max_tokens,
            temperature: Some(options.temperature),
            image: None,
        };
        self.send("gen_ai.turn", &request).await
    }

    /// Ask for a greeting layered on top of the primed conversation.
    ///
    /// The greeting query itself is not part of `primed`; only the reply is
    /// meant to be appended by the caller.
    pub async fn greet(
        &self,
        primed: &Conversation,
        options: &Options,
        has_summary: bool,
    ) -> Result<String, BackendError> {
        let query = if has_summary {
            GREETING_QUERY_WITH_SUMMARY
        } else {
            GREETING_QUERY
        };

        let mut messages = primed.messages().to_vec();
        messages.push(Message::user(query));

        let request = CompletionRequest {
            model: options.model.clone(),
            messages,
            max_tokens: options.max_tokens,
            temperature: Some(GREETING_TEMPERATURE),
            image: None,
        };
        self.send("gen_ai.greeting", &request).await
    }

    /// Ask a single question about an image, outside the rolling window.
    pub async fn ask_about_image(
        &self,
        question: &str,
        image: ImageAttachment,
        options: &Options,
    ) -> Result<String, BackendError> {
        let request = CompletionRequest {
            model: options.model.clone(),
            messages: vec![Message::user(question)],
            max_tokens: options.max_tokens,
            temperature: Some(options.temperature),
            image: Some(image),
        };
        self.send("gen_ai.image", &request).await
    }

    async fn send(&self, span_name: &'static str, request: &CompletionRequest) -> Result<String, BackendError> {
        let span = info_span!(
            "gen_ai.complete",
            call = span_name,
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            message_count = request.messages.len(),
        );

        let result = self.provider.complete(request).instrument(span).await;
        if let Err(ref e) = result {
            tracing::warn!(call = span_name, error = %e, "backend call failed");
        }
        result
    }
}
