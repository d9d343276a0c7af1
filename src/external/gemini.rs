//! Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ExternalCallPool, ExternalError};

pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Single-shot text generation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model's text answer. An answer with no text is
    /// [`ExternalError::Empty`].
    async fn generate(&self, prompt: &str) -> Result<String, ExternalError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated.
    fn text(self) -> Option<String> {
        let text = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<String>();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    pool: ExternalCallPool,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: impl Into<String>, model: impl Into<String>, pool: ExternalCallPool) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE_URL.to_string(),
            pool,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, ExternalError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(%status, body = %text, "gemini request failed");
            return Err(ExternalError::Status {
                service: "gemini",
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| ExternalError::Malformed(e.to_string()))?;
        parsed.text().ok_or(ExternalError::Empty)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, ExternalError> {
        let answer = self.pool.run("gemini", || self.generate_once(prompt)).await?;
        debug!(answer_len = answer.len(), "gemini answered");
        Ok(answer)
    }
}
