use super::{CohereClient, ProviderError};
use crate::history::{Role, Turn};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::{debug, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini generateContent backend. Persona, transcript, and the new message
/// are rendered into a single text part; an attached image is fetched and
/// inlined as base64. Failures other than explicit rejection degrade once to
/// the Cohere backend when one is configured.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    preamble: String,
    fallback: Option<CohereClient>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        model: String,
        max_tokens: u32,
        preamble: String,
        fallback: Option<CohereClient>,
    ) -> Self {
        Self {
            http,
            api_key,
            model,
            max_tokens,
            preamble,
            fallback,
        }
    }

    pub async fn respond(
        &self,
        text: &str,
        history: &[Turn],
        image_url: Option<&str>,
    ) -> Result<String, ProviderError> {
        match self.generate(text, history, image_url).await {
            Ok(reply) => Ok(reply),
            // Explicit rejections propagate; the fallback is only for
            // transient fetch/HTTP failures.
            Err(err @ (ProviderError::RateLimited(_) | ProviderError::QuotaExhausted(_))) => {
                Err(err)
            }
            Err(err) => {
                let Some(fallback) = &self.fallback else {
                    return Err(err);
                };
                warn!("Gemini request failed, falling back to Cohere: {err}");
                fallback.respond(text, history).await
            }
        }
    }

    async fn generate(
        &self,
        text: &str,
        history: &[Turn],
        image_url: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut parts = vec![Part::Text {
            text: render_prompt(&self.preamble, history, text),
        }];
        if let Some(url) = image_url {
            let (mime_type, bytes) = self.fetch_image(url).await?;
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type,
                    data: base64::engine::general_purpose::STANDARD.encode(bytes),
                },
            });
        }

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
            },
        };

        let url = format!(
            "{GEMINI_BASE_URL}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        debug!("Sending request to Gemini ({})", self.model);
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Other(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("Gemini returned {status}: {body}"),
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Other(err.to_string()))?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Other("Gemini returned no candidates".to_string()))?;
        let reply = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        Ok(reply)
    }

    async fn fetch_image(&self, url: &str) -> Result<(String, Vec<u8>), ProviderError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| ProviderError::Other(format!("image fetch failed: {err}")))?;
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ProviderError::Other(format!("image fetch failed: {err}")))?;
        Ok((mime_type, bytes.to_vec()))
    }
}

fn render_prompt(preamble: &str, history: &[Turn], text: &str) -> String {
    let mut prompt = String::new();
    if !preamble.is_empty() {
        prompt.push_str(preamble);
        prompt.push_str("\n\n");
    }
    for turn in history {
        let speaker = match turn.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        let _ = writeln!(prompt, "{speaker}: {}", turn.text);
    }
    let _ = write!(prompt, "User: {text}");
    prompt
}
