//! The canonical conversation record.
//!
//! A `Conversation` is an ordered, append-only list of messages. It
//! serializes transparently as a JSON array of `{role, content}` objects,
//! which is also the persisted format.

use serde::{Deserialize, Serialize};

use crate::llm::{Message, MessageRole};

/// Number of leading system messages that seed every session
/// (system prompt + live system snapshot).
pub const PRIMING_MESSAGES: usize = 2;

/// Label prepended to an injected prior-session summary.
pub const SUMMARY_PREFIX: &str = "Previous conversation summary: ";

/// Ordered sequence of messages; insertion order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the priming block for a fresh session.
    ///
    /// `[system: prompt, system: snapshot]`, followed by
    /// `[system: "Previous conversation summary: ..."]` when a summary exists.
    pub fn primed(system_prompt: &str, system_snapshot: &str, summary: Option<&str>) -> Self {
        let mut conversation = Self::new();
        conversation.push(Message::system(system_prompt));
        conversation.push(Message::system(system_snapshot));
        if let Some(summary) = summary {
            conversation.push(Message::system(format!("{SUMMARY_PREFIX}{summary}")));
        }
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether a persisted conversation carries enough history to be worth
    /// summarizing (more than the two priming messages).
    pub fn is_substantial(&self) -> bool {
        self.messages.len() > PRIMING_MESSAGES
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push(Message::system(content));
    }

    /// Messages that were not authored as system context.
    pub fn non_system(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
