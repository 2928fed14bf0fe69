//! Google Gemini API integration.
//!
//! [`GeminiClient`] implements the [`ContentGenerator`] port by calling the
//! `generateContent` REST endpoint with a single user prompt.

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::{mask_secret, MAX_DURATION_SECS};
use crate::error::BotError;
use crate::text::sanitize_for_logging;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Produces text from a prompt.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BotError>;
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    /// Builds a client for `model`.
    ///
    /// Construction failures are logged with their cause and surfaced as
    /// [`BotError::GenerationClientInit`].
    pub fn new(api_key: &str, model: &str) -> Result<Self, BotError> {
        info!("Initializing Gemini client for model {}", model);
        debug!("Gemini API key (masked): {}", mask_secret(api_key));

        let http = Client::builder()
            .timeout(Duration::from_secs(MAX_DURATION_SECS))
            .build()
            .map_err(|e| {
                error!("Failed to initialize Gemini: {}", e);
                BotError::GenerationClientInit(Box::new(e))
            })?;

        Ok(GeminiClient {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, BotError> {
        let url = self.endpoint();
        info!("Sending generateContent request to {}", url);

        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // reqwest includes the URL, and with it the key, in its Display output
                let e = e.without_url();
                error!("Gemini request failed: {}", e);
                BotError::generation(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        info!("Received Gemini response with status: {}", status);

        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to read Gemini response body: {}", e);
            BotError::generation(format!("Failed to read Gemini response: {}", e))
        })?;

        if !status.is_success() {
            debug!(
                "Gemini error response: {}",
                sanitize_for_logging(&body, 200)
            );
            return Err(api_error(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            BotError::generation(format!("Invalid Gemini response: {}", e))
        })?;

        parsed.into_text()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    ///
    /// A response with no candidates, or whose text is blank, is unusable.
    pub(crate) fn into_text(self) -> Result<String, BotError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            error!("Gemini returned no candidates: {}", reason);
            return Err(BotError::generation(format!(
                "Gemini returned no content ({})",
                reason
            )));
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            error!("Gemini returned an empty response");
            return Err(BotError::generation("Gemini returned an empty response"));
        }

        Ok(text)
    }
}

/// Maps a non-success response to a [`BotError::GenerationRequest`] that keeps the status.
fn api_error(status: StatusCode, body: &str) -> BotError {
    let detail = api_error_message(body).unwrap_or_else(|| status.to_string());
    BotError::GenerationRequest {
        message: format!("Gemini API error ({}): {}", status, detail),
        status: Some(status.as_u16()),
    }
}

/// Extracts `error.message` from a Gemini error body.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(|message| sanitize_for_logging(message, 200))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_into_text_joins_parts_of_first_candidate() {
        let response = parse(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "Shipping "}, {"text": "today!"}], "role": "model"}},
                    {"content": {"parts": [{"text": "ignored"}]}}
                ]
            }"#,
        );
        assert_eq!(response.into_text().unwrap(), "Shipping today!");
    }

    #[test]
    fn test_blocked_prompt_reports_reason() {
        let response = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        let err = response.into_text().unwrap_err();
        assert_eq!(err.to_string(), "Gemini returned no content (SAFETY)");
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let response = parse(r#"{"candidates": [{"content": {"parts": [{"text": "  \n"}]}}]}"#);
        assert!(matches!(
            response.into_text(),
            Err(BotError::GenerationRequest { status: None, .. })
        ));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body).as_deref(), Some("API key not valid."));
        assert_eq!(api_error_message("<html>"), None);
    }

    #[test]
    fn test_api_error_keeps_upstream_status() {
        let body = r#"{"error": {"code": 401, "message": "Unauthorized: API key expired.", "status": "UNAUTHENTICATED"}}"#;
        let err = api_error(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert!(err.to_string().contains("Unauthorized"));

        let body = r#"{"error": {"code": 403, "message": "Permission denied.", "status": "PERMISSION_DENIED"}}"#;
        let err = api_error(StatusCode::FORBIDDEN, body);
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Gemini API error (403 Forbidden): Permission denied."
        );
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("key", "gemini-1.5-pro").unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
