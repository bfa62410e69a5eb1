//! Context window selection.
//!
//! Decides which messages of the canonical conversation are sent on a given
//! request. The leading priming block is always kept; from the remainder only
//! the most recent `2 * size` messages (one user + one assistant message per
//! unit of window size) are sent. A size of `0` means unbounded.
//!
//! Selection never mutates the conversation: dropped messages stay available
//! for persistence and for later requests with a larger window.

use sage_types::conversation::{Conversation, PRIMING_MESSAGES};
use sage_types::llm::Message;

/// The messages chosen for one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSelection {
    pub messages: Vec<Message>,
    /// How many historical messages were left out of this request.
    pub dropped: usize,
    /// How many non-priming messages the window admits (`None` = unbounded).
    pub limit: Option<usize>,
}

impl WindowSelection {
    /// Whether older turns were left out and the user should be told.
    pub fn is_trimmed(&self) -> bool {
        self.dropped > 0
    }

    /// User-facing advisory for a trimmed window.
    pub fn advisory(&self) -> Option<String> {
        match self.limit {
            Some(limit) if self.is_trimmed() => Some(format!(
                "The conversation history exceeds the context window size. \
                 Only the most recent {limit} messages (plus system messages) \
                 will be used for context."
            )),
            _ => None,
        }
    }
}

/// Select the window of `conversation` for a request with the given size.
pub fn select(conversation: &Conversation, context_window_size: usize) -> WindowSelection {
    let all = conversation.messages();

    if context_window_size == 0 {
        return WindowSelection {
            messages: all.to_vec(),
            dropped: 0,
            limit: None,
        };
    }

    let keep_recent = context_window_size.saturating_mul(2);
    let priming = PRIMING_MESSAGES.min(all.len());
    let (head, rest) = all.split_at(priming);

    if rest.len() <= keep_recent {
        return WindowSelection {
            messages: all.to_vec(),
            dropped: 0,
            limit: Some(keep_recent),
        };
    }

    let dropped = rest.len() - keep_recent;
    let mut messages = Vec::with_capacity(priming + keep_recent);
    messages.extend_from_slice(head);
    messages.extend_from_slice(&rest[dropped..]);

    tracing::debug!(
        dropped,
        kept = keep_recent,
        "context window trimmed older messages for this request"
    );

    WindowSelection {
        messages,
        dropped,
        limit: Some(keep_recent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation_with_turns(turns: usize) -> Conversation {
        let mut conv = Conversation::primed("prompt", "snapshot", None);
        for i in 0..turns {
            conv.push_user(format!("q{i}"));
            conv.push_assistant(format!("a{i}"));
        }
        conv
    }

    #[test]
    fn test_zero_size_is_unbounded() {
        let conv = conversation_with_turns(50);
        let selection = select(&conv, 0);
        assert_eq!(selection.messages, conv.messages());
        assert_eq!(selection.dropped, 0);
        assert!(selection.advisory().is_none());
    }

    #[test]
    fn test_short_history_is_untouched() {
        let conv = conversation_with_turns(2);
        let selection = select(&conv, 5);
        assert_eq!(selection.messages, conv.messages());
        assert!(!selection.is_trimmed());
    }

    #[test]
    fn test_trims_to_recent_pairs_and_keeps_priming() {
        let conv = conversation_with_turns(5);
        let selection = select(&conv, 2);

        assert_eq!(selection.messages.len(), 2 + 4);
        assert_eq!(selection.messages[0].content, "prompt");
        assert_eq!(selection.messages[1].content, "snapshot");
        let tail: Vec<_> = selection.messages[2..]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(tail, vec!["q3", "a3", "q4", "a4"]);
        assert_eq!(selection.dropped, 6);
    }

    #[test]
    fn test_selection_does_not_change_canonical_length() {
        let conv = conversation_with_turns(8);
        let before = conv.len();
        let _ = select(&conv, 1);
        assert_eq!(conv.len(), before);
    }

    #[test]
    fn test_bound_holds_for_every_size() {
        let conv = conversation_with_turns(7);
        for size in 1..10 {
            let selection = select(&conv, size);
            assert_eq!(&selection.messages[..2], &conv.messages()[..2]);
            assert!(selection.messages.len() - 2 <= 2 * size);
            assert_eq!(
                selection.messages.last(),
                conv.messages().last(),
                "most recent message must always be sent"
            );
        }
    }

    #[test]
    fn test_odd_tail_after_pending_user_message() {
        let mut conv = conversation_with_turns(3);
        conv.push_user("pending");
        let selection = select(&conv, 1);
        let tail: Vec<_> = selection.messages[2..]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(tail, vec!["a2", "pending"]);
    }

    #[test]
    fn test_advisory_mentions_limit() {
        let conv = conversation_with_turns(4);
        let selection = select(&conv, 1);
        let advisory = selection.advisory().unwrap();
        assert!(advisory.contains("most recent 2 messages"));
    }

    #[test]
    fn test_handles_conversation_shorter_than_priming() {
        let mut conv = Conversation::new();
        conv.push_system("only prompt");
        let selection = select(&conv, 1);
        assert_eq!(selection.messages.len(), 1);
    }
}
