use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::GenerationError;
use crate::models::settings::{AiSettings, DEFAULT_AI_BASE_URL, DEFAULT_AI_MODEL};
use super::traits::TextGenerator;

const PROVIDER: &str = "Gemini";

/// Google Gemini `generateContent` client.
///
/// - **Auth**: API key in the `x-goog-api-key` header, never in the URL.
/// - **Endpoint**: `{base}/v1beta/models/{model}:generateContent`
/// - No request timeout: the caller decides how long to wait.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn from_settings(settings: &AiSettings) -> Self {
        Self::new(settings.base_url.clone(), settings.model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_AI_BASE_URL, DEFAULT_AI_MODEL)
    }
}

// ── Gemini API request/response types ───────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling Gemini");
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(classify_error(status, &raw));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| GenerationError::Api {
            provider: PROVIDER.into(),
            status: status.as_u16(),
            message: format!("Failed to parse response: {e}"),
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse {
                provider: PROVIDER.into(),
            });
        }
        Ok(text)
    }
}

/// Map a non-2xx response onto [`GenerationError`].
///
/// Gemini reports a bad key as HTTP 400 with reason `API_KEY_INVALID`,
/// so the body has to be inspected as well as the status.
fn classify_error(status: StatusCode, raw: &str) -> GenerationError {
    let envelope: Option<ErrorEnvelope> = serde_json::from_str(raw).ok();
    let key_invalid = envelope.as_ref().is_some_and(|env| {
        env.error
            .details
            .iter()
            .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
    });

    if key_invalid || status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return GenerationError::Unauthorized {
            provider: PROVIDER.into(),
        };
    }

    let message = envelope
        .map(|env| env.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| raw.chars().take(200).collect());
    GenerationError::Api {
        provider: PROVIDER.into(),
        status: status.as_u16(),
        message,
    }
}
