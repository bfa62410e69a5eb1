//! AES-256-GCM encryption for the stored API key.
//!
//! The master key lives either in a hex key file in the data directory or in
//! the OS keychain. An existing key file always wins, then an existing
//! keychain entry. A new key is only generated while no API key is stored,
//! in the keychain when one is reachable and in the key file otherwise.
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext`
//!
//! SECURITY: Errors never contain plaintext or key material.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use sage_types::error::SecretError;

use super::{hex_decode, hex_encode};

/// Nonce size for AES-256-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

const KEYCHAIN_SERVICE: &str = "sage";
const KEYCHAIN_USER: &str = "api-key-master";

/// Symmetric cipher over a 32-byte master key.
///
/// Each encryption call generates a random 12-byte nonce, prepended to the
/// ciphertext.
pub struct VaultCrypto {
    cipher: Aes256Gcm,
}

impl VaultCrypto {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Load or generate the master key in a hex file, readable only by the
    /// owner.
    pub async fn from_key_file(path: &Path) -> Result<Self, SecretError> {
        match tokio::fs::read_to_string(path).await {
            Ok(hex_key) => return Ok(Self::new(&parse_key(hex_key.trim())?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(SecretError::MasterKey(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        }

        let key = rand_bytes();
        write_private(path, &hex_encode(&key)).await?;
        tracing::info!("generated new master key at {}", path.display());
        Ok(Self::new(&key))
    }

    /// Open the master key that protects `ciphertext_file`.
    ///
    /// Order: existing `key_file`, existing keychain entry, then a new key.
    /// While `ciphertext_file` exists no new key is generated, since it
    /// could never decrypt what is already stored.
    pub async fn open(key_file: &Path, ciphertext_file: &Path) -> Result<Self, SecretError> {
        if exists(key_file).await {
            return Self::from_key_file(key_file).await;
        }

        let keychain = match keychain_entry() {
            Ok(entry) => match entry.get_password() {
                Ok(hex_key) => return Ok(Self::new(&parse_key(&hex_key)?)),
                Err(keyring::Error::NoEntry) => Some(entry),
                Err(e) => {
                    tracing::debug!("keychain unavailable: {e}");
                    None
                }
            },
            Err(e) => {
                tracing::debug!("{e}");
                None
            }
        };

        if exists(ciphertext_file).await {
            return Err(SecretError::MasterKey(format!(
                "no master key found for {}; remove it to enter the API key again",
                ciphertext_file.display()
            )));
        }

        match keychain {
            Some(entry) => {
                let key = rand_bytes();
                entry
                    .set_password(&hex_encode(&key))
                    .map_err(|e| SecretError::MasterKey(format!("keychain error: {e}")))?;
                tracing::info!("generated new master key in the OS keychain");
                Ok(Self::new(&key))
            }
            None => Self::from_key_file(key_file).await,
        }
    }

    /// Encrypt plaintext, returning `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, SecretError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| SecretError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by [`VaultCrypto::encrypt`].
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE {
            return Err(SecretError::DecryptionFailed);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| SecretError::DecryptionFailed)
    }
}

fn keychain_entry() -> Result<keyring::Entry, SecretError> {
    keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER)
        .map_err(|e| SecretError::MasterKey(format!("keychain unavailable: {e}")))
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn parse_key(hex_key: &str) -> Result<[u8; 32], SecretError> {
    let bytes = hex_decode(hex_key)
        .map_err(|_| SecretError::MasterKey("corrupted master key".to_string()))?;
    bytes
        .try_into()
        .map_err(|_| SecretError::MasterKey("invalid master key length".to_string()))
}

/// Generate 32 random bytes using the OS CSPRNG.
fn rand_bytes() -> [u8; 32] {
    use aes_gcm::aead::rand_core::RngCore;
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

/// Write a file with owner-only permissions, creating its directory.
pub(crate) async fn write_private(path: &Path, contents: &str) -> Result<(), SecretError> {
    let storage_err = |e: std::io::Error| SecretError::Storage(format!("{}: {e}", path.display()));

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
    }
    tokio::fs::write(path, contents).await.map_err(storage_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(storage_err)?;
    }
    Ok(())
}
