//! Environment variable credential store.
//!
//! Read-only and highest priority: an exported `OPENAI_API_KEY` always wins
//! over the stored key.

use sage_core::repository::credential::CredentialStore;
use sage_types::error::SecretError;

/// Default variable holding the cloud backend key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Reads the API key from an environment variable.
pub struct EnvCredentialStore {
    var: String,
}

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self::with_var(API_KEY_ENV)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn name(&self) -> &str {
        "environment"
    }

    async fn get(&self) -> Result<Option<String>, SecretError> {
        Ok(std::env::var(&self.var)
            .ok()
            .filter(|value| !value.trim().is_empty()))
    }

    async fn set(&self, _value: &str) -> Result<(), SecretError> {
        Err(SecretError::ReadOnly)
    }

    async fn remove(&self) -> Result<bool, SecretError> {
        Err(SecretError::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_store_get_existing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("SAGE_TEST_API_KEY_1", "test-value-123") };

        let store = EnvCredentialStore::with_var("SAGE_TEST_API_KEY_1");
        assert_eq!(store.get().await.unwrap().as_deref(), Some("test-value-123"));

        // SAFETY: the variable was just set above.
        unsafe { std::env::remove_var("SAGE_TEST_API_KEY_1") };
    }

    #[tokio::test]
    async fn test_env_store_get_missing() {
        let store = EnvCredentialStore::with_var("SAGE_NONEXISTENT_VAR_XYZ");
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_env_store_is_read_only() {
        let store = EnvCredentialStore::new();
        assert!(matches!(store.set("x").await, Err(SecretError::ReadOnly)));
        assert!(matches!(store.remove().await, Err(SecretError::ReadOnly)));
    }
}
