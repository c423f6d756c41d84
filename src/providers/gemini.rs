//! REST client for the Gemini `generateContent` endpoint.
//!
//! Auth is the `x-goog-api-key` header. Only the text parts of the first
//! candidate are read.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CopilotError;
use crate::types::Config;

use super::{check_status, http_client, CompletionService};

const SERVICE: &str = "Gemini";

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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout_secs: Option<u64>,
    ) -> Result<Self, CopilotError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CopilotError> {
        let key = config
            .gemini_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CopilotError::MissingApiKey(SERVICE))?;
        Self::new(
            key,
            &config.model,
            &config.gemini_base_url,
            config.request_timeout_secs,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: GenerateResponse) -> Result<String, CopilotError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CopilotError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CopilotError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        log::info!(
            "Gemini request: model={} prompt_chars={}",
            self.model,
            prompt.chars().count()
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = check_status(SERVICE, resp).await?;

        let text = resp.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| CopilotError::MalformedResponse(format!("Gemini response: {}", e)))?;
        response_text(parsed)
    }
}
