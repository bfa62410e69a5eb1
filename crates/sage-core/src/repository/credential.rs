//! Credential store trait definition.

use sage_types::error::SecretError;

/// Stores the cloud backend API key.
///
/// Implementations (environment, encrypted file) are chained in priority
/// order by sage-infra. Values cross this boundary as plain strings; callers
/// wrap them in `secrecy::SecretString` immediately.
pub trait CredentialStore: Send + Sync {
    /// Human-readable store name for status output.
    fn name(&self) -> &str;

    /// Return the stored key, or `None` when this store holds none.
    fn get(&self) -> impl std::future::Future<Output = Result<Option<String>, SecretError>> + Send;

    /// Replace the stored key.
    fn set(&self, value: &str) -> impl std::future::Future<Output = Result<(), SecretError>> + Send;

    /// Remove the stored key. Returns whether anything was removed.
    fn remove(&self) -> impl std::future::Future<Output = Result<bool, SecretError>> + Send;
}

/// Mask a key for display, keeping a short prefix and suffix.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 10 {
        "****".to_string()
    } else {
        let head: String = chars[..5].iter().collect();
        let tail: String = chars[chars.len() - 5..].iter().collect();
        format!("{head}...{tail}")
    }
}
