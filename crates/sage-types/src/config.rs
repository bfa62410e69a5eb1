//! Session options for Sage.
//!
//! `Options` is the process-wide configuration record. It is assembled from
//! built-in defaults, then a system-wide file, then a user file; each file
//! is a partial JSON object whose keys override the previous layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Which backend serves completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Cloud chat-completion API.
    #[default]
    OpenAi,
    /// Local inference daemon.
    Ollama,
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelProvider::OpenAi => write!(f, "openai"),
            ModelProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ModelProvider::OpenAi),
            "ollama" => Ok(ModelProvider::Ollama),
            other => Err(format!("invalid model provider: '{other}'")),
        }
    }
}

/// Models offered by the options editor when no `models.json` is installed.
pub const DEFAULT_AVAILABLE_MODELS: &[&str] = &[
    "gpt-4",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-16k",
    "gpt-4o-mini",
    "gpt-4o",
];

/// Default loopback endpoint of the local inference daemon.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/chat";

/// Process-wide configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    pub model: String,
    pub model_provider: ModelProvider,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f64,
    pub max_tokens: u32,
    /// Number of user/assistant pairs sent per request; `0` means unbounded.
    pub context_window_size: usize,
    pub terminal_emulator: String,
    pub ollama_url: String,
    /// Upper bound on a single backend call.
    pub request_timeout_secs: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            model_provider: ModelProvider::OpenAi,
            temperature: 0.3,
            max_tokens: 1500,
            context_window_size: 10,
            terminal_emulator: "gnome-terminal".to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// One configuration layer as read from disk. Every key is optional.
///
/// Numeric fields are deliberately wide (`f64`/`i64`) so that out-of-range
/// values parse and can be reported individually instead of rejecting the
/// whole file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsLayer {
    pub model: Option<String>,
    pub model_provider: Option<ModelProvider>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
    pub context_window_size: Option<i64>,
    pub terminal_emulator: Option<String>,
    pub ollama_url: Option<String>,
    pub request_timeout_secs: Option<i64>,
}

impl Options {
    /// Overlay a configuration layer onto these options.
    ///
    /// Invalid values are skipped (the current value is kept) and returned
    /// as [`ConfigError::Invalid`] so the caller can report them.
    pub fn apply_layer(&mut self, layer: OptionsLayer) -> Vec<ConfigError> {
        let mut problems = Vec::new();

        if let Some(model) = layer.model {
            if model.trim().is_empty() {
                problems.push(ConfigError::invalid("model", "must not be empty"));
            } else {
                self.model = model;
            }
        }
        if let Some(provider) = layer.model_provider {
            self.model_provider = provider;
        }
        if let Some(temperature) = layer.temperature {
            if (0.0..=1.0).contains(&temperature) {
                self.temperature = temperature;
            } else {
                problems.push(ConfigError::invalid(
                    "temperature",
                    format!("{temperature} is outside 0.0..=1.0"),
                ));
            }
        }
        if let Some(max_tokens) = layer.max_tokens {
            match u32::try_from(max_tokens) {
                Ok(value) if value > 0 => self.max_tokens = value,
                _ => problems.push(ConfigError::invalid(
                    "max_tokens",
                    format!("{max_tokens} must be greater than 0"),
                )),
            }
        }
        if let Some(size) = layer.context_window_size {
            match usize::try_from(size) {
                Ok(value) => self.context_window_size = value,
                Err(_) => problems.push(ConfigError::invalid(
                    "context_window_size",
                    format!("{size} must be 0 or greater"),
                )),
            }
        }
        if let Some(terminal) = layer.terminal_emulator {
            if terminal.trim().is_empty() {
                problems.push(ConfigError::invalid("terminal_emulator", "must not be empty"));
            } else {
                self.terminal_emulator = terminal;
            }
        }
        if let Some(url) = layer.ollama_url {
            self.ollama_url = url;
        }
        if let Some(timeout) = layer.request_timeout_secs {
            match u64::try_from(timeout) {
                Ok(value) if value > 0 => self.request_timeout_secs = value,
                _ => problems.push(ConfigError::invalid(
                    "request_timeout_secs",
                    format!("{timeout} must be greater than 0"),
                )),
            }
        }

        problems
    }
}

/// Shape of the installed `models.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub available_models: Vec<String>,
}

pub fn default_available_models() -> Vec<String> {
    DEFAULT_AVAILABLE_MODELS.iter().map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.model, "gpt-4o-mini");
        assert_eq!(options.model_provider, ModelProvider::OpenAi);
        assert!((options.temperature - 0.3).abs() < f64::EPSILON);
        assert_eq!(options.max_tokens, 1500);
        assert_eq!(options.context_window_size, 10);
        assert_eq!(options.terminal_emulator, "gnome-terminal");
    }

    #[test]
    fn test_provider_serde() {
        let json = serde_json::to_string(&ModelProvider::Ollama).unwrap();
        assert_eq!(json, "\"ollama\"");
        let parsed: ModelProvider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(parsed, ModelProvider::OpenAi);
    }

    #[test]
    fn test_provider_from_str_roundtrip() {
        for provider in [ModelProvider::OpenAi, ModelProvider::Ollama] {
            let parsed: ModelProvider = provider.to_string().parse().unwrap();
            assert_eq!(parsed, provider);
        }
        assert!("anthropic".parse::<ModelProvider>().is_err());
    }

    #[test]
    fn test_layer_overrides_only_present_keys() {
        let mut options = Options::default();
        let layer: OptionsLayer =
            serde_json::from_str(r#"{"model": "llama3", "model_provider": "ollama"}"#).unwrap();
        let problems = options.apply_layer(layer);
        assert!(problems.is_empty());
        assert_eq!(options.model, "llama3");
        assert_eq!(options.model_provider, ModelProvider::Ollama);
        assert_eq!(options.max_tokens, 1500);
    }

    #[test]
    fn test_layer_rejects_out_of_range_values() {
        let mut options = Options::default();
        let layer: OptionsLayer = serde_json::from_str(
            r#"{"temperature": 1.5, "max_tokens": 0, "context_window_size": -1}"#,
        )
        .unwrap();
        let problems = options.apply_layer(layer);
        assert_eq!(problems.len(), 3);
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_layer_accepts_zero_window() {
        let mut options = Options::default();
        let layer: OptionsLayer = serde_json::from_str(r#"{"context_window_size": 0}"#).unwrap();
        assert!(options.apply_layer(layer).is_empty());
        assert_eq!(options.context_window_size, 0);
    }

    #[test]
    fn test_options_serde_roundtrip() {
        let options = Options {
            model_provider: ModelProvider::Ollama,
            context_window_size: 3,
            ..Options::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let parsed: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_model_catalog_defaults_to_empty() {
        let catalog: ModelCatalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.available_models.is_empty());
        assert!(default_available_models().contains(&"gpt-4o".to_string()));
    }
}
