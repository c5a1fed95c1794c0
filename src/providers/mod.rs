mod cohere;
mod gemini;
mod openai;

pub use cohere::CohereClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::config::{Config, ProviderKind};
use crate::history::Turn;
use thiserror::Error;

/// A backend failure, classified by what the caller should tell the user.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub(crate) fn from_status(status: u16, detail: String) -> Self {
        match status {
            429 => Self::RateLimited(detail),
            402 | 403 => Self::QuotaExhausted(detail),
            _ => Self::Other(detail),
        }
    }
}

/// The closed set of chat backends. One variant is active per process,
/// selected by `PROVIDER`; every variant answers through the same contract.
pub enum LlmBackend {
    Cohere(CohereClient),
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
}

impl LlmBackend {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();
        match config.provider {
            ProviderKind::Cohere => Ok(Self::Cohere(CohereClient::new(
                http,
                required(&config.cohere_api_key, "COHERE_API_KEY")?,
                config.cohere_model.clone(),
                config.max_tokens,
                config.system_prompt.clone(),
            ))),
            ProviderKind::OpenAi => Ok(Self::OpenAi(OpenAiClient::new(
                required(&config.openai_api_key, "OPENAI_API_KEY")?,
                config.openai_model.clone(),
                config.max_tokens,
                config.system_prompt.clone(),
            ))),
            ProviderKind::Gemini => {
                // Cohere doubles as the one-level fallback when its key is
                // configured alongside Gemini's.
                let fallback = config.cohere_api_key.as_ref().map(|key| {
                    CohereClient::new(
                        http.clone(),
                        key.clone(),
                        config.cohere_model.clone(),
                        config.max_tokens,
                        config.system_prompt.clone(),
                    )
                });
                Ok(Self::Gemini(GeminiClient::new(
                    http,
                    required(&config.gemini_api_key, "GEMINI_API_KEY")?,
                    config.gemini_model.clone(),
                    config.max_tokens,
                    config.system_prompt.clone(),
                    fallback,
                )))
            }
        }
    }

    /// Produce a single reply string for the new user text, given the shared
    /// transcript and an optional image URL. Each variant owns its own
    /// request shaping and response extraction.
    pub async fn respond(
        &self,
        text: &str,
        history: &[Turn],
        image_url: Option<&str>,
    ) -> Result<String, ProviderError> {
        match self {
            // The Cohere chat endpoint is text-only; an attached image is ignored.
            Self::Cohere(client) => client.respond(text, history).await,
            Self::OpenAi(client) => client.respond(text, history, image_url).await,
            Self::Gemini(client) => client.respond(text, history, image_url).await,
        }
    }
}

fn required(value: &Option<String>, name: &str) -> anyhow::Result<String> {
    value
        .clone()
        .ok_or_else(|| anyhow::anyhow!("{name} must be set for the selected provider"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: ProviderKind) -> Config {
        Config {
            discord_token: "token".to_string(),
            provider,
            cohere_api_key: Some("cohere-key".to_string()),
            cohere_model: "command-r-plus".to_string(),
            openai_api_key: Some("openai-key".to_string()),
            openai_model: "gpt-4o-mini".to_string(),
            gemini_api_key: Some("gemini-key".to_string()),
            gemini_model: "gemini-1.5-flash".to_string(),
            max_tokens: 150,
            system_prompt: "persona".to_string(),
            whitelist_enabled: false,
            allowed_guild_ids: Vec::new(),
            log_channel_id: None,
            ops_guild_id: None,
        }
    }

    #[test]
    fn selects_the_configured_backend() {
        assert!(matches!(
            LlmBackend::from_config(&config(ProviderKind::Cohere)),
            Ok(LlmBackend::Cohere(_))
        ));
        assert!(matches!(
            LlmBackend::from_config(&config(ProviderKind::OpenAi)),
            Ok(LlmBackend::OpenAi(_))
        ));
        assert!(matches!(
            LlmBackend::from_config(&config(ProviderKind::Gemini)),
            Ok(LlmBackend::Gemini(_))
        ));
    }

    #[test]
    fn missing_key_for_selected_backend_is_a_startup_error() {
        let mut cohere_only = config(ProviderKind::Cohere);
        cohere_only.cohere_api_key = None;
        assert!(LlmBackend::from_config(&cohere_only).is_err());

        // The fallback key is optional: Gemini alone still constructs.
        let mut gemini_only = config(ProviderKind::Gemini);
        gemini_only.cohere_api_key = None;
        assert!(LlmBackend::from_config(&gemini_only).is_ok());
    }

    #[test]
    fn http_status_classification() {
        assert!(matches!(
            ProviderError::from_status(429, String::new()),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(
            ProviderError::from_status(402, String::new()),
            ProviderError::QuotaExhausted(_)
        ));
        assert!(matches!(
            ProviderError::from_status(403, String::new()),
            ProviderError::QuotaExhausted(_)
        ));
        assert!(matches!(
            ProviderError::from_status(500, String::new()),
            ProviderError::Other(_)
        ));
    }
}
