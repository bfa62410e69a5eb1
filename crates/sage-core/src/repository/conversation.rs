//! Conversation store trait definition.

use sage_types::conversation::Conversation;
use sage_types::error::PersistenceError;

/// Persists the single conversation record between sessions.
pub trait ConversationStore: Send + Sync {
    /// Load the persisted conversation.
    ///
    /// A missing record is `Ok` with an empty conversation. A malformed
    /// record is an `Err`; callers report it and continue with an empty
    /// conversation.
    fn load(&self) -> impl std::future::Future<Output = Result<Conversation, PersistenceError>> + Send;

    /// Write the conversation, creating the containing directory if needed.
    fn save(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;

    /// Delete the record. Idempotent: succeeds when nothing is stored.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;
}
