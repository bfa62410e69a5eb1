//! Filesystem layout for Sage.
//!
//! Every file Sage reads or writes is named here, once, at startup.
//! Components receive a [`SagePaths`] instead of reaching for globals.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SAGE_DATA_DIR";

const SYSTEM_CONFIG_FILE: &str = "/etc/sage/config.json";
const MODELS_FILE: &str = "/etc/sage/models.json";
const SYSTEM_PROMPT_FILE: &str = "/usr/share/sage/system_prompt.txt";

/// Built-in persona used when no prompt file is installed.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Sage, a wise and patient advisor for the user's \
Linux system. Answer clearly and concisely. When a task can be done from the shell, give the \
exact commands in ```bash fenced code blocks, one command per line, so the user can run them. \
Warn before anything destructive.";

/// Resolved locations of every Sage file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagePaths {
    pub data_dir: PathBuf,
    pub conversation_file: PathBuf,
    pub user_config_file: PathBuf,
    pub system_config_file: PathBuf,
    pub models_file: PathBuf,
    pub system_prompt_file: PathBuf,
    pub user_system_prompt_file: PathBuf,
    pub secret_key_file: PathBuf,
    pub api_key_file: PathBuf,
    pub capture_file: PathBuf,
}

impl SagePaths {
    /// Lay out all paths under `data_dir`, with system-wide files at their
    /// installed locations.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            conversation_file: data_dir.join("conversation.json"),
            user_config_file: data_dir.join("config.json"),
            system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
            models_file: PathBuf::from(MODELS_FILE),
            system_prompt_file: PathBuf::from(SYSTEM_PROMPT_FILE),
            user_system_prompt_file: data_dir.join("system_prompt.txt"),
            secret_key_file: data_dir.join("secret.key"),
            api_key_file: data_dir.join("api.enc"),
            capture_file: data_dir.join("capture.png"),
            data_dir,
        }
    }

    /// Keep every file inside `data_dir`, including the ones normally read
    /// from system locations. Used by tests.
    pub fn isolated(data_dir: impl Into<PathBuf>) -> Self {
        let mut paths = Self::new(data_dir);
        paths.system_config_file = paths.data_dir.join("system-config.json");
        paths.models_file = paths.data_dir.join("models.json");
        paths.system_prompt_file = paths.data_dir.join("system-prompt-default.txt");
        paths
    }

    /// Resolve from an explicit override, then the environment, then home.
    pub fn resolve(override_dir: Option<&Path>) -> Self {
        match override_dir {
            Some(dir) => Self::new(dir),
            None => Self::new(resolve_data_dir()),
        }
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `SAGE_DATA_DIR` environment variable
/// 2. `~/.sage`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".sage");
    }

    PathBuf::from(".sage")
}

/// Load the persona prompt: user override, then installed file, then the
/// built-in default.
pub async fn load_system_prompt(paths: &SagePaths) -> String {
    for path in [&paths.user_system_prompt_file, &paths.system_prompt_file] {
        match tokio::fs::read_to_string(path).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!("system prompt loaded from {}", path.display());
                return text.trim().to_string();
            }
            Ok(_) => tracing::warn!("{} is empty, ignoring", path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("Failed to read {}: {err}", path.display()),
        }
    }
    DEFAULT_SYSTEM_PROMPT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_under_data_dir() {
        let paths = SagePaths::new("/home/user/.sage");
        assert_eq!(
            paths.conversation_file,
            PathBuf::from("/home/user/.sage/conversation.json")
        );
        assert_eq!(paths.user_config_file, PathBuf::from("/home/user/.sage/config.json"));
        assert_eq!(paths.secret_key_file, PathBuf::from("/home/user/.sage/secret.key"));
        assert_eq!(paths.system_config_file, PathBuf::from("/etc/sage/config.json"));
        assert_eq!(paths.models_file, PathBuf::from("/etc/sage/models.json"));
    }

    #[test]
    fn test_override_wins() {
        let paths = SagePaths::resolve(Some(Path::new("/tmp/sage-override")));
        assert_eq!(paths.data_dir, PathBuf::from("/tmp/sage-override"));
    }

    #[tokio::test]
    async fn test_system_prompt_precedence() {
        let dir = tempdir().unwrap();
        let paths = SagePaths::isolated(dir.path());

        assert_eq!(load_system_prompt(&paths).await, DEFAULT_SYSTEM_PROMPT);

        tokio::fs::write(&paths.system_prompt_file, "installed prompt\n")
            .await
            .unwrap();
        assert_eq!(load_system_prompt(&paths).await, "installed prompt");

        tokio::fs::write(&paths.user_system_prompt_file, "my prompt")
            .await
            .unwrap();
        assert_eq!(load_system_prompt(&paths).await, "my prompt");
    }
}
