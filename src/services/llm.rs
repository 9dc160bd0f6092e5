use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::FilterParameters;

/// Fixed instruction describing the filter parameter schema.
const SYSTEM_PROMPT: &str = "Convert natural language property searches to API parameters. \
Return JSON with: city, state, minPrice, maxPrice, minBedrooms, maxBedrooms, propertyType. \
propertyType must be one of \"Single Family\", \"Condo\", \"Townhouse\", \"Multi-Family\". \
Example: \"3 bedroom house under 400k in Austin TX\" -> \
{\"city\":\"Austin\",\"state\":\"TX\",\"maxPrice\":400000,\"minBedrooms\":3,\"propertyType\":\"Single Family\"}";

/// Errors that can occur when calling the language-model interpreter
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// OpenAI-style chat-completion client used as the remote query
/// interpreter. A single attempt per query; any failure falls back to
/// the rule-based interpreter at the call site.
pub struct LlmClient {
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: Client,
}

impl LlmClient {
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        temperature: f32,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            api_key,
            model,
            max_tokens,
            temperature,
            client,
        }
    }

    /// Ask the model to convert free text into filter parameters.
    pub async fn interpret(&self, text: &str) -> Result<FilterParameters, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.endpoint.trim_end_matches('/')
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::ApiError(format!(
                "Interpreter call failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let content = json
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| LlmError::InvalidResponse("Missing message content".into()))?;

        serde_json::from_str(strip_code_fence(content))
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse parameters: {}", e)))
    }
}

/// Strip optional Markdown code-fence wrapping from model output.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Language tag casing varies between models
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
