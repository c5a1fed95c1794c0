use super::ProviderError;
use crate::history::{Role, Turn};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use tracing::debug;

/// At most this many transcript turns are sent per request, dropped from the
/// front when the shared history has grown past it.
const MAX_PROMPT_MESSAGES: usize = 20;

/// OpenAI chat-completions backend. Persona and history are rendered into one
/// ordered list of role-tagged messages; an attached image becomes a second
/// content part on the current turn.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    preamble: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, preamble: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model,
            max_tokens,
            preamble,
        }
    }

    pub async fn respond(
        &self,
        text: &str,
        history: &[Turn],
        image_url: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
                .content(self.preamble.clone())
                .build()
                .map_err(other)?
                .into()];

        for turn in truncate_front(history, MAX_PROMPT_MESSAGES) {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(other)?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(other)?
                    .into(),
            };
            messages.push(message);
        }

        let current: ChatCompletionRequestMessage = match image_url {
            Some(url) => {
                let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
                    ChatCompletionRequestMessageContentPartTextArgs::default()
                        .text(text)
                        .build()
                        .map_err(other)?
                        .into(),
                    ChatCompletionRequestMessageContentPartImageArgs::default()
                        .image_url(ImageUrlArgs::default().url(url).build().map_err(other)?)
                        .build()
                        .map_err(other)?
                        .into(),
                ];
                ChatCompletionRequestUserMessageArgs::default()
                    .content(parts)
                    .build()
                    .map_err(other)?
                    .into()
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(other)?
                .into(),
        };
        messages.push(current);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(self.max_tokens)
            .messages(messages)
            .build()
            .map_err(other)?;

        debug!("Sending request to OpenAI ({})", self.model);
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify)?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        Ok(content)
    }
}

fn truncate_front(history: &[Turn], max: usize) -> &[Turn] {
    if history.len() > max {
        &history[history.len() - max..]
    } else {
        history
    }
}

fn classify(err: OpenAIError) -> ProviderError {
    match &err {
        OpenAIError::ApiError(api) => match api.code.as_deref() {
            Some("rate_limit_exceeded") => ProviderError::RateLimited(api.message.clone()),
            Some("insufficient_quota") => ProviderError::QuotaExhausted(api.message.clone()),
            _ => ProviderError::Other(err.to_string()),
        },
        _ => ProviderError::Other(err.to_string()),
    }
}

fn other(err: OpenAIError) -> ProviderError {
    ProviderError::Other(err.to_string())
}
