//! Credential chain: environment first, then the encrypted file.
//!
//! Writes and removals always go to the file store; the environment is
//! read-only.

use sage_core::repository::credential::CredentialStore;
use sage_types::error::SecretError;

use super::EncryptedFileCredentialStore;
use super::env::EnvCredentialStore;

pub struct CredentialChain<E = EnvCredentialStore, F = EncryptedFileCredentialStore> {
    env: E,
    file: F,
}

impl<E: CredentialStore, F: CredentialStore> CredentialChain<E, F> {
    pub fn new(env: E, file: F) -> Self {
        Self { env, file }
    }

    /// Resolve the key and report which store supplied it.
    pub async fn resolve(&self) -> Result<Option<(String, &str)>, SecretError> {
        if let Some(value) = self.env.get().await? {
            return Ok(Some((value, self.env.name())));
        }
        Ok(self.file.get().await?.map(|value| (value, self.file.name())))
    }
}

impl<E: CredentialStore, F: CredentialStore> CredentialStore for CredentialChain<E, F> {
    fn name(&self) -> &str {
        "chain"
    }

    async fn get(&self) -> Result<Option<String>, SecretError> {
        Ok(self.resolve().await?.map(|(value, _)| value))
    }

    async fn set(&self, value: &str) -> Result<(), SecretError> {
        self.file.set(value).await
    }

    async fn remove(&self) -> Result<bool, SecretError> {
        self.file.remove().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::vault::VaultCrypto;
    use tempfile::tempdir;

    fn file_store(dir: &std::path::Path) -> EncryptedFileCredentialStore {
        EncryptedFileCredentialStore::new(dir.join("api.enc"), VaultCrypto::new(&[7u8; 32]))
    }

    #[tokio::test]
    async fn test_env_takes_precedence() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("SAGE_TEST_CHAIN_KEY", "from-env") };
        let dir = tempdir().unwrap();
        let chain = CredentialChain::new(
            EnvCredentialStore::with_var("SAGE_TEST_CHAIN_KEY"),
            file_store(dir.path()),
        );
        chain.set("from-file").await.unwrap();

        let (value, source) = chain.resolve().await.unwrap().unwrap();
        assert_eq!(value, "from-env");
        assert_eq!(source, "environment");

        // SAFETY: the variable was just set above.
        unsafe { std::env::remove_var("SAGE_TEST_CHAIN_KEY") };
    }

    #[tokio::test]
    async fn test_falls_back_to_file_and_writes_there() {
        let dir = tempdir().unwrap();
        let chain = CredentialChain::new(
            EnvCredentialStore::with_var("SAGE_TEST_CHAIN_UNSET"),
            file_store(dir.path()),
        );

        assert!(chain.get().await.unwrap().is_none());
        chain.set("sk-stored").await.unwrap();
        assert_eq!(chain.get().await.unwrap().as_deref(), Some("sk-stored"));
        assert!(chain.remove().await.unwrap());
        assert!(chain.get().await.unwrap().is_none());
    }
}
