use crate::config::Settings;
use crate::llm::error::GenerationError;
use crate::llm::{GenerationBackend, GenerationCandidate};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self { http, api_key })
    }

    fn request_body(prompt: &str) -> GenerateContentRequest<'_> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[async_trait::async_trait]
impl GenerationBackend for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        candidate: &GenerationCandidate,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let label = candidate.label();

        // Errors are stripped of their URL: the query string carries the API key.
        let res = self
            .http
            .post(candidate.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::transport(&label, format!("request failed: {}", e.without_url())))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            GenerationError::transport(&label, format!("failed to read body: {}", e.without_url()))
        })?;

        classify_response(&label, status, &text)
    }
}

/// Maps a raw HTTP answer onto success text or a classified error.
pub fn classify_response(
    label: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> Result<String, GenerationError> {
    let parsed = match serde_json::from_str::<GenerateContentResponse>(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            return Err(GenerationError::transport(
                label,
                format!("malformed response body (status={status}): {err}"),
            )
            .with_raw_output(body));
        }
    };

    if let Some(error) = parsed.error {
        let detail = match error.status {
            Some(s) => format!("{s}: {}", error.message),
            None => error.message,
        };
        return Err(GenerationError::provider(label, detail).with_raw_output(body));
    }

    if !status.is_success() {
        return Err(GenerationError::provider(label, format!("status={status}")).with_raw_output(body));
    }

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text);

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("no generated text (blockReason={r})"))
                .unwrap_or_else(|| "no generated text in response".to_string());
            Err(GenerationError::provider(label, reason).with_raw_output(body))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}
