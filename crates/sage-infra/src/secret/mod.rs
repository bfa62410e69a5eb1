//! Credential store implementations.
//!
//! - `env`: Environment variable store (read-only, highest priority)
//! - `chain`: Env first, then the encrypted file
//! - `EncryptedFileCredentialStore`: AES-256-GCM encrypted key file

pub mod chain;
pub mod env;

use std::path::PathBuf;

use sage_core::repository::credential::CredentialStore;
use sage_types::error::SecretError;

use crate::crypto::vault::{VaultCrypto, write_private};
use crate::crypto::{hex_decode, hex_encode};

/// Stores the API key hex-encoded and encrypted in a single file.
pub struct EncryptedFileCredentialStore {
    path: PathBuf,
    crypto: VaultCrypto,
}

impl EncryptedFileCredentialStore {
    pub fn new(path: impl Into<PathBuf>, crypto: VaultCrypto) -> Self {
        Self {
            path: path.into(),
            crypto,
        }
    }
}

impl CredentialStore for EncryptedFileCredentialStore {
    fn name(&self) -> &str {
        "encrypted file"
    }

    async fn get(&self) -> Result<Option<String>, SecretError> {
        let hex_encrypted = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SecretError::Storage(format!(
                    "{}: {err}",
                    self.path.display()
                )));
            }
        };

        let encrypted = hex_decode(hex_encrypted.trim()).map_err(|_| SecretError::DecryptionFailed)?;
        let plaintext = self.crypto.decrypt(&encrypted)?;

        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|_| SecretError::DecryptionFailed)
    }

    async fn set(&self, value: &str) -> Result<(), SecretError> {
        let encrypted = self.crypto.encrypt(value.as_bytes())?;
        write_private(&self.path, &hex_encode(&encrypted)).await
    }

    async fn remove(&self) -> Result<bool, SecretError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(SecretError::Storage(format!(
                "{}: {err}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.enc");
        let store = EncryptedFileCredentialStore::new(&path, VaultCrypto::new(&test_key()));

        assert!(store.get().await.unwrap().is_none());
        store.set("sk-secret-value-123").await.unwrap();
        assert_eq!(
            store.get().await.unwrap().as_deref(),
            Some("sk-secret-value-123")
        );

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_file_store_overwrite_and_remove() {
        let dir = tempdir().unwrap();
        let store =
            EncryptedFileCredentialStore::new(dir.path().join("api.enc"), VaultCrypto::new(&test_key()));

        store.set("value-1").await.unwrap();
        store.set("value-2").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("value-2"));

        assert!(store.remove().await.unwrap());
        assert!(!store.remove().await.unwrap());
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_master_key_fails_to_decrypt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.enc");
        EncryptedFileCredentialStore::new(&path, VaultCrypto::new(&test_key()))
            .set("sk-abc")
            .await
            .unwrap();

        let mut other = test_key();
        other[31] ^= 0xFF;
        let store = EncryptedFileCredentialStore::new(&path, VaultCrypto::new(&other));
        assert!(matches!(store.get().await, Err(SecretError::DecryptionFailed)));
    }
}
