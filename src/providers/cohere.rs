use super::ProviderError;
use crate::history::{Role, Turn};
use serde::{Deserialize, Serialize};
use tracing::debug;

const COHERE_CHAT_URL: &str = "https://api.cohere.com/v1/chat";
const TEMPERATURE: f64 = 0.9;

/// Cohere v1 chat backend. The request is flat: instruction, history,
/// message, and persona are all distinct top-level fields.
pub struct CohereClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    preamble: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    message: &'a str,
    chat_history: Vec<HistoryEntry<'a>>,
    preamble: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct HistoryEntry<'a> {
    role: &'static str,
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    text: String,
}

impl CohereClient {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        model: String,
        max_tokens: u32,
        preamble: String,
    ) -> Self {
        Self {
            http,
            api_key,
            model,
            max_tokens,
            preamble,
        }
    }

    pub async fn respond(&self, text: &str, history: &[Turn]) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            message: text,
            chat_history: history_entries(history),
            preamble: &self.preamble,
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        };

        debug!("Sending request to Cohere ({})", self.model);
        let response = self
            .http
            .post(COHERE_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Other(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("Cohere returned {status}: {body}"),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Other(err.to_string()))?;
        Ok(parsed.text)
    }
}

fn history_entries(history: &[Turn]) -> Vec<HistoryEntry<'_>> {
    history
        .iter()
        .map(|turn| HistoryEntry {
            role: match turn.role {
                Role::User => "USER",
                Role::Assistant => "CHATBOT",
            },
            message: &turn.text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_cohere_wire_names() {
        let history = vec![Turn::user("hi"), Turn::assistant("meow")];
        let request = ChatRequest {
            model: "command-r-plus",
            message: "how are you",
            chat_history: history_entries(&history),
            preamble: "persona",
            max_tokens: 150,
            temperature: TEMPERATURE,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "command-r-plus",
                "message": "how are you",
                "chat_history": [
                    { "role": "USER", "message": "hi" },
                    { "role": "CHATBOT", "message": "meow" },
                ],
                "preamble": "persona",
                "max_tokens": 150,
                "temperature": 0.9,
            })
        );
    }
}
