//! Model backend implementations.
//!
//! Concrete [`LlmProvider`](sage_core::llm::provider::LlmProvider)s for the
//! OpenAI chat-completion API and the local Ollama daemon, plus
//! [`select_provider`], which builds the backend named by the current
//! options. It is called per turn, so an options change applies to the next
//! request without a restart.

pub mod ollama;
pub mod openai;

#[cfg(test)]
pub(crate) mod stub;

use std::time::Duration;

use secrecy::SecretString;

use sage_core::llm::box_provider::BoxLlmProvider;
use sage_types::config::{ModelProvider, Options};
use sage_types::llm::{BackendError, BackendErrorKind};

use self::ollama::OllamaProvider;
use self::openai::OpenAiProvider;

/// Build the backend selected by `options.model_provider`.
///
/// The OpenAI backend requires `api_key`; Ollama ignores it.
pub fn select_provider(
    options: &Options,
    api_key: Option<&SecretString>,
) -> Result<BoxLlmProvider, BackendError> {
    let timeout = Duration::from_secs(options.request_timeout_secs);

    match options.model_provider {
        ModelProvider::OpenAi => {
            let key = api_key.ok_or_else(|| {
                BackendError::new(
                    BackendErrorKind::AuthenticationFailed,
                    "no OpenAI API key configured; use the 'api' command to add one",
                )
            })?;
            Ok(BoxLlmProvider::new(OpenAiProvider::new(key, timeout)))
        }
        ModelProvider::Ollama => {
            let provider = OllamaProvider::new(&options.ollama_url, timeout)?;
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sage_types::llm::{CompletionRequest, Message};

    #[test]
    fn test_openai_requires_key() {
        let result = select_provider(&Options::default(), None);
        match result {
            Err(e) => assert_eq!(e.kind, BackendErrorKind::AuthenticationFailed),
            Ok(_) => panic!("expected AuthenticationFailed"),
        }
    }

    #[test]
    fn test_openai_with_key() {
        let key = SecretString::from("sk-test".to_string());
        let provider = select_provider(&Options::default(), Some(&key)).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let options = Options {
            model_provider: ModelProvider::Ollama,
            ..Options::default()
        };
        let provider = select_provider(&options, None).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[tokio::test]
    async fn test_switching_to_ollama_targets_local_endpoint() {
        let (url, captured) = stub::serve_once(200, r#"{"message":{"role":"assistant","content":"local"}}"#).await;
        let key = SecretString::from("sk-test".to_string());
        let mut options = Options {
            ollama_url: url,
            ..Options::default()
        };
        assert_eq!(options.model_provider, ModelProvider::OpenAi);
        assert_eq!(select_provider(&options, Some(&key)).unwrap().name(), "openai");

        options.model_provider = ModelProvider::Ollama;
        let provider = select_provider(&options, Some(&key)).unwrap();
        assert_eq!(provider.name(), "ollama");

        let request = CompletionRequest {
            model: options.model.clone(),
            messages: vec![
                Message::system("persona"),
                Message::system("snapshot"),
                Message::user("hi"),
            ],
            max_tokens: options.max_tokens,
            temperature: Some(options.temperature),
            image: None,
        };
        let reply = provider.complete(&request).await.unwrap();
        assert_eq!(reply, "local");

        let sent = captured.await.unwrap();
        assert!(sent.request_line.starts_with("POST /api/chat"));
        let body: serde_json::Value = serde_json::from_str(&sent.body).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "hi");
    }
}
