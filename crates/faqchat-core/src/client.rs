//! HTTP clients for the two chatbot backend variants.
//!
//! The chat variant keeps per-turn role structure; the single-question
//! variant submits one flattened string. Both expect a JSON response body
//! carrying a string `response` field; anything else is a malformed
//! response, surfaced as a named error variant rather than silently
//! defaulted.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::state::ChatMessage;

/// Default per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("backend request failed with status: {0}")]
    Status(StatusCode),
    #[error("Invalid response format")]
    MalformedResponse,
}

impl BackendError {
    /// The string substituted as the assistant turn's content when the
    /// backend call fails. The turn is still closed normally, so the error
    /// reads like a bot reply and the session stays usable.
    pub fn fallback_reply(&self) -> String {
        format!("Error: {self}")
    }
}

/// Extract the reply string from a backend response body.
fn parse_reply(body: &serde_json::Value) -> Result<String, BackendError> {
    body.get("response")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or(BackendError::MalformedResponse)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
}

/// Client for the chat-variant backend (`POST {base}/generate-response/`).
#[derive(Clone)]
pub struct ChatBackendClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ChatBackendClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Submit the decoded conversation (system turn included) and return the
    /// assistant reply. One attempt, no retries.
    pub async fn generate(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let url = format!("{}/generate-response/", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&ChatRequest { messages })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let body: serde_json::Value = response.json().await?;
        parse_reply(&body)
    }
}

/// Client for the single-question backend (`POST {base}/`).
#[derive(Clone)]
pub struct QuestionBackendClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl QuestionBackendClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Submit the flattened question string and return the reply.
    pub async fn ask(&self, question: &str) -> Result<String, BackendError> {
        let url = format!("{}/", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&QuestionRequest { question })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let body: serde_json::Value = response.json().await?;
        parse_reply(&body)
    }
}
