use thiserror::Error;

/// Errors reading or writing the persisted conversation record.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read conversation record: {0}")]
    Read(String),

    #[error("failed to write conversation record: {0}")]
    Write(String),

    #[error("conversation record is malformed: {0}")]
    Malformed(String),

    #[error("conversation record uses the legacy summary format and was ignored")]
    LegacyFormat,
}

/// Errors from option files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors launching external programs (terminals, capture tools, shells).
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("terminal emulator '{0}' not found; install it or choose another in options")]
    TerminalNotFound(String),

    #[error("failed to launch '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("no screen capture tool found (tried: {0})")]
    CaptureUnavailable(String),

    #[error("screen capture was cancelled")]
    CaptureCancelled,
}

/// Errors from the credential store.
///
/// Display output never includes key material or plaintext.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("no API key is stored")]
    NotFound,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("failed to decrypt the stored API key")]
    DecryptionFailed,

    #[error("master key unavailable: {0}")]
    MasterKey(String),

    #[error("credential storage error: {0}")]
    Storage(String),

    #[error("credential store is read-only")]
    ReadOnly,
}
