//! JSON file conversation store.
//!
//! The record is the raw message list, `[{"role": ..., "content": ...}]`,
//! pretty-printed. Older installs wrote a categorized summary object instead;
//! that shape is recognized and reported rather than parsed.

use std::path::PathBuf;

use sage_core::repository::conversation::ConversationStore;
use sage_types::conversation::Conversation;
use sage_types::error::PersistenceError;

/// Stores the conversation at a single JSON path.
pub struct JsonConversationStore {
    path: PathBuf,
}

impl JsonConversationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn decode(&self, content: &str) -> Result<Conversation, PersistenceError> {
        if content.trim().is_empty() {
            return Ok(Conversation::new());
        }

        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| PersistenceError::Malformed(format!("{}: {e}", self.path.display())))?;

        if value.is_object() {
            return Err(PersistenceError::LegacyFormat);
        }

        serde_json::from_value(value)
            .map_err(|e| PersistenceError::Malformed(format!("{}: {e}", self.path.display())))
    }
}

impl ConversationStore for JsonConversationStore {
    async fn load(&self) -> Result<Conversation, PersistenceError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No conversation at {}, starting fresh", self.path.display());
                return Ok(Conversation::new());
            }
            Err(err) => {
                return Err(PersistenceError::Read(format!("{}: {err}", self.path.display())));
            }
        };

        let conversation = self.decode(&content)?;
        tracing::debug!(messages = conversation.len(), "conversation loaded");
        Ok(conversation)
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistenceError::Write(format!("{}: {e}", parent.display())))?;
        }

        let json = serde_json::to_string_pretty(conversation)
            .map_err(|e| PersistenceError::Write(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PersistenceError::Write(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(messages = conversation.len(), "conversation saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistenceError::Write(format!(
                "{}: {err}",
                self.path.display()
            ))),
        }
    }
}
