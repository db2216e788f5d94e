//! Google Gemini fallback capability.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompt::{build_prompt, strip_code_fences};
use super::{FallbackCapability, FallbackRequest, FallbackResponse};
use crate::error::FallbackError;
use crate::models::config::FallbackConfig;

/// Error bodies longer than this are cut in error messages.
const MAX_ERROR_BODY: usize = 512;

const USER_AGENT: &str = concat!("ccintel/", env!("CARGO_PKG_VERSION"));

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    max_prompt_chars: usize,
}

impl GeminiClient {
    /// Create a client with default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, FallbackError> {
        Self::from_config(api_key, &FallbackConfig::default())
    }

    pub fn from_config(
        api_key: impl Into<String>,
        config: &FallbackConfig,
    ) -> Result<Self, FallbackError> {
        info!("Creating Gemini fallback client: model={}", config.model);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FallbackError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            max_prompt_chars: config.max_prompt_chars,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Turn a `generateContent` response body into field values.
fn interpret_response(body: &str) -> Result<FallbackResponse, FallbackError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| FallbackError::MalformedResponse(format!("invalid response body: {}", e)))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(FallbackError::Rejected(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| FallbackError::Rejected("no candidates returned".to_string()))?;

    let answer: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if answer.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(FallbackError::Rejected(format!(
            "empty answer (finish reason: {})",
            reason
        )));
    }

    let value: serde_json::Value = serde_json::from_str(strip_code_fences(&answer))
        .map_err(|e| FallbackError::MalformedResponse(format!("answer is not JSON: {}", e)))?;

    FallbackResponse::from_json(&value)
}

#[async_trait]
impl FallbackCapability for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn attempt(&self, request: &FallbackRequest<'_>) -> Result<FallbackResponse, FallbackError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(request.text, request.missing_fields, self.max_prompt_chars),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.0,
            },
        };

        debug!("Sending Gemini request: model={}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FallbackError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        interpret_response(&text)
    }
}
