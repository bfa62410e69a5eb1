//! Prior-session summarizer.
//!
//! `ConversationSummarizer` digests a finished conversation into free text
//! about the user, suitable for re-injection as a single system message at
//! the next bootstrap. Only user-visible turns are sent; system context is
//! excluded and the model is told not to describe itself.

use sage_types::config::Options;
use sage_types::conversation::{Conversation, SUMMARY_PREFIX};
use sage_types::llm::{CompletionRequest, Message};

use crate::llm::box_provider::BoxLlmProvider;

/// Instruction prompt for the summarization call.
const SUMMARY_PROMPT: &str = r#"Please summarize the following conversation by extracting key points about the user only. Organize the summary into these categories:

1. User Preferences: The user's likes, dislikes, and preferences.
2. Interests: Topics the user is interested in or passionate about.
3. Goals: Short-term and long-term objectives the user has attempted to achieve.
4. Personal Information: Relevant personal details the user has shared and their system information.

Gather as much information about the user and their system beyond that gathered at initiation. Remember their goals.
Do not include any details about the AI assistant's capabilities, traits."#;

/// Digesting regime: low temperature, short output, independent of the
/// configured session temperature.
pub const SUMMARY_TEMPERATURE: f64 = 0.2;
pub const SUMMARY_MAX_TOKENS: u32 = 500;

/// Stateless utility for summarizing a conversation.
pub struct ConversationSummarizer;

impl ConversationSummarizer {
    /// Build the single user-turn prompt: the instruction followed by one
    /// `"<Role>: <content>"` line per non-system message.
    pub fn build_prompt(conversation: &Conversation) -> String {
        let mut prompt = SUMMARY_PROMPT.to_string();
        for message in conversation.non_system() {
            prompt.push('\n');
            prompt.push_str(message.role.label());
            prompt.push_str(": ");
            prompt.push_str(&message.content);
        }
        prompt
    }

    /// The summary carried by an earlier bootstrap, if the conversation has one.
    pub fn previous_summary(conversation: &Conversation) -> Option<String> {
        conversation
            .messages()
            .iter()
            .filter(|m| m.is_system())
            .find_map(|m| m.content.strip_prefix(SUMMARY_PREFIX))
            .map(str::to_string)
    }

    /// Summarize `conversation` through the configured backend.
    ///
    /// Returns `None` on backend failure or an empty reply; callers treat
    /// that as "no summary available" and continue. A conversation without
    /// any user or assistant turns carries its previous summary forward
    /// instead of calling the backend.
    #[tracing::instrument(
        name = "summarize_conversation",
        skip(provider, conversation, options),
        fields(
            backend = provider.name(),
            model = %options.model,
            message_count = conversation.len(),
        )
    )]
    pub async fn summarize(
        provider: &BoxLlmProvider,
        conversation: &Conversation,
        options: &Options,
    ) -> Option<String> {
        if conversation.non_system().next().is_none() {
            return Self::previous_summary(conversation);
        }

        let request = CompletionRequest {
            model: options.model.clone(),
            messages: vec![Message::user(Self::build_prompt(conversation))],
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: Some(SUMMARY_TEMPERATURE),
            image: None,
        };

        match provider.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!("summarization returned an empty reply");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "summarization failed, continuing without a summary");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;
    use sage_types::llm::{BackendError, MessageRole};

    fn finished_conversation() -> Conversation {
        let mut conv = Conversation::primed("SECRET PROMPT", "Host: box", None);
        conv.push_assistant("Greetings, seeker.");
        conv.push_user("I run Arch and love Rust");
        conv.push_system("Command executed: pacman -Syu (output handled in separate terminal)");
        conv.push_assistant("Then update often.");
        conv
    }

    #[test]
    fn test_prompt_excludes_system_turns() {
        let prompt = ConversationSummarizer::build_prompt(&finished_conversation());
        assert!(prompt.starts_with("Please summarize the following conversation"));
        assert!(prompt.contains("\nUser: I run Arch and love Rust"));
        assert!(prompt.contains("\nAssistant: Then update often."));
        assert!(!prompt.contains("SECRET PROMPT"));
        assert!(!prompt.contains("pacman"));
    }

    #[test]
    fn test_prompt_instructions() {
        assert!(SUMMARY_PROMPT.contains("User Preferences"));
        assert!(SUMMARY_PROMPT.contains("Interests"));
        assert!(SUMMARY_PROMPT.contains("Goals"));
        assert!(SUMMARY_PROMPT.contains("Personal Information"));
        assert!(SUMMARY_PROMPT.contains("Do not include any details about the AI assistant"));
    }

    #[tokio::test]
    async fn test_summarize_uses_digest_regime() {
        let (provider, requests) = ScriptedProvider::boxed(vec![Ok("  Likes Rust.  ".to_string())]);
        let options = Options {
            temperature: 0.9,
            max_tokens: 4000,
            ..Options::default()
        };

        let summary =
            ConversationSummarizer::summarize(&provider, &finished_conversation(), &options).await;

        assert_eq!(summary.as_deref(), Some("Likes Rust."));
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, 500);
        assert_eq!(request.model, options.model);
    }

    #[tokio::test]
    async fn test_summarize_failure_yields_none() {
        let (provider, _) = ScriptedProvider::boxed(vec![Err(BackendError::provider("500"))]);
        let summary =
            ConversationSummarizer::summarize(&provider, &finished_conversation(), &Options::default())
                .await;
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn test_system_only_history_carries_previous_summary() {
        let (provider, requests) = ScriptedProvider::boxed(vec![]);
        let conv = Conversation::primed("p", "s", Some("Prefers vim."));

        let summary = ConversationSummarizer::summarize(&provider, &conv, &Options::default()).await;

        assert_eq!(summary.as_deref(), Some("Prefers vim."));
        assert!(requests.lock().unwrap().is_empty());
    }
}
