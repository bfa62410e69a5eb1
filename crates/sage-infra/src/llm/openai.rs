//! OpenAI chat-completion backend.
//!
//! Uses [`async_openai`] for request/response types. The reply is the first
//! choice's message content.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    CreateChatCompletionRequest, ImageUrl,
};
use secrecy::{ExposeSecret, SecretString};

use sage_core::llm::provider::LlmProvider;
use sage_types::llm::{
    BackendError, BackendErrorKind, CompletionRequest, ImageAttachment, Message, MessageRole,
};

/// Cloud chat-completion backend.
///
/// Does NOT derive Debug: the client holds the API key.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: &SecretString, timeout: Duration) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        Self {
            client: Client::with_config(config),
            timeout,
        }
    }

    fn build_request(request: &CompletionRequest) -> CreateChatCompletionRequest {
        let image_target = request.image.as_ref().and_then(|_| {
            request
                .messages
                .iter()
                .rposition(|m| m.role == MessageRole::User)
        });

        let messages = request
            .messages
            .iter()
            .enumerate()
            .map(|(i, msg)| match (&request.image, image_target == Some(i)) {
                (Some(image), true) => user_with_image(&msg.content, image),
                _ => to_openai_message(msg),
            })
            .collect();

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        }
    }
}

fn to_openai_message(msg: &Message) -> ChatCompletionRequestMessage {
    match msg.role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            })
        }
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

fn user_with_image(text: &str, image: &ImageAttachment) -> ChatCompletionRequestMessage {
    let parts = vec![
        ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText {
                text: text.to_string(),
            },
        ),
        ChatCompletionRequestUserMessageContentPart::ImageUrl(
            ChatCompletionRequestMessageContentPartImage {
                image_url: ImageUrl {
                    url: image.data_url(),
                    detail: None,
                },
            },
        ),
    ];
    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
        content: ChatCompletionRequestUserMessageContent::Array(parts),
        name: None,
    })
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let oai_request = Self::build_request(request);

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(oai_request))
            .await
            .map_err(|_| {
                BackendError::new(
                    BackendErrorKind::Timeout,
                    format!("no reply within {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(map_openai_error)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                BackendError::new(BackendErrorKind::InvalidResponse, "reply has no message content")
            })
    }
}

/// Map an `async_openai` error to a [`BackendError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> BackendError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                BackendError::new(BackendErrorKind::AuthenticationFailed, api_err.message.clone())
            } else {
                BackendError::provider(api_err.message.clone())
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if reqwest_err.status().map(|s| s.as_u16()) == Some(401) {
                BackendError::new(BackendErrorKind::AuthenticationFailed, err.to_string())
            } else if reqwest_err.is_timeout() {
                BackendError::new(BackendErrorKind::Timeout, err.to_string())
            } else {
                BackendError::provider(err.to_string())
            }
        }
        OpenAIError::JSONDeserialize(_, content) => BackendError::new(
            BackendErrorKind::InvalidResponse,
            format!("failed to parse response: {content}"),
        ),
        _ => BackendError::provider(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image: Option<ImageAttachment>) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                Message::system("persona"),
                Message::user("earlier"),
                Message::assistant("reply"),
                Message::user("what is on my screen?"),
            ],
            max_tokens: 1500,
            temperature: Some(0.3),
            image,
        }
    }

    #[test]
    fn test_build_request_keeps_every_role() {
        let req = OpenAiProvider::build_request(&request(None));
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.max_completion_tokens, Some(1500));
        assert_eq!(req.messages.len(), 4);
        assert!(matches!(req.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(req.messages[2], ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_image_attached_as_data_url_on_last_user_message() {
        let image = ImageAttachment {
            media_type: "image/png".to_string(),
            data_base64: "QUJD".to_string(),
        };
        let req = OpenAiProvider::build_request(&request(Some(image)));

        match &req.messages[3] {
            ChatCompletionRequestMessage::User(user) => match &user.content {
                ChatCompletionRequestUserMessageContent::Array(parts) => {
                    assert_eq!(parts.len(), 2);
                    match &parts[1] {
                        ChatCompletionRequestUserMessageContentPart::ImageUrl(part) => {
                            assert_eq!(part.image_url.url, "data:image/png;base64,QUJD");
                        }
                        _ => panic!("expected image part"),
                    }
                }
                _ => panic!("expected content parts"),
            },
            _ => panic!("expected user message"),
        }
        assert!(matches!(
            &req.messages[1],
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(_),
                ..
            })
        ));
    }

    #[test]
    fn test_provider_name() {
        let key = SecretString::from("sk-test".to_string());
        let provider = OpenAiProvider::new(&key, Duration::from_secs(5));
        assert_eq!(provider.name(), "openai");
    }
}
