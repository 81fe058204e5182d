//! Single-shot client for an OpenAI-compatible `/chat/completions` endpoint.
//!
//! Every call is one request and one response: a system message, a user
//! message, `stream = false`. Nothing is retried here. Failures are mapped to
//! an [`LlmError`] variant chosen by what the caller should do next:
//!
//! | Remote outcome | Variant | Caller action |
//! |----------------|---------|---------------|
//! | HTTP 401 | [`LlmError::Auth`] | fix the credential in settings |
//! | HTTP 429 | [`LlmError::RateLimit`] | wait and resubmit |
//! | deadline exceeded | [`LlmError::Timeout`] | resubmit, maybe with less text |
//! | anything else | [`LlmError::Upstream`] | show the remote message |
//!
//! The [`CompletionClient`] trait is the seam the pipeline depends on; tests
//! swap in a scripted client instead of talking to the network.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Invalid or missing API key. Please check the api_key in your settings.")]
    Auth,
    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimit,
    #[error("Request timed out after {0}s. Please try again.")]
    Timeout(u64),
    #[error("API error: {0}")]
    Upstream(String),
}

/// Token budget, sampling temperature and deadline for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Anything that can turn a (system, user) prompt pair into text.
pub trait CompletionClient {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for `{base_url}/chat/completions` with bearer auth.
pub struct ChatCompletionsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionClient for ChatCompletionsClient {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::Auth);
        }

        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: system_prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_prompt,
        });
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stream: false,
        };

        debug!(
            url = %self.url(),
            prompt_chars = user_prompt.len(),
            max_tokens = options.max_tokens,
            "sending completion request"
        );

        let response = self
            .http
            .post(self.url())
            .bearer_auth(self.api_key.trim())
            .header("Accept", "application/json")
            .timeout(options.timeout)
            .json(&request)
            .send()
            .map_err(|e| transport_error(e, options.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| transport_error(e, options.timeout))?;

        if !(200..300).contains(&status) {
            let err = classify_failure(status, &body);
            warn!(status, error = %err, "completion request failed");
            return Err(err);
        }

        extract_text(&body)
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(timeout.as_secs())
    } else {
        LlmError::Upstream(format!("HTTP request failed: {err}"))
    }
}

/// Map a non-success HTTP status and body to an [`LlmError`].
///
/// The remote `error.message` field is passed through when present.
pub fn classify_failure(status: u16, body: &str) -> LlmError {
    match status {
        401 => LlmError::Auth,
        429 => LlmError::RateLimit,
        _ => {
            let remote = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string));
            LlmError::Upstream(remote.unwrap_or_else(|| format!("HTTP {status}: {body}")))
        }
    }
}

/// Pull `choices[0].message.content` out of a successful response body.
pub fn extract_text(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Upstream(format!("Failed to parse response JSON: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::Upstream("Response contained no completion text".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth() {
        assert_eq!(classify_failure(401, "{}"), LlmError::Auth);
    }

    #[test]
    fn throttled_maps_to_rate_limit() {
        assert_eq!(classify_failure(429, ""), LlmError::RateLimit);
    }

    #[test]
    fn other_status_carries_remote_message() {
        let body = r#"{"error":{"message":"Insufficient Balance","type":"invalid_request"}}"#;
        assert_eq!(
            classify_failure(402, body),
            LlmError::Upstream("Insufficient Balance".into())
        );
    }

    #[test]
    fn other_status_without_message_falls_back_to_status_and_body() {
        assert_eq!(
            classify_failure(503, "bad gateway"),
            LlmError::Upstream("HTTP 503: bad gateway".into())
        );
    }

    #[test]
    fn extracts_first_choice_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Hello");
    }

    #[test]
    fn empty_choices_is_upstream_error() {
        assert!(matches!(
            extract_text(r#"{"choices":[]}"#),
            Err(LlmError::Upstream(_))
        ));
    }

    #[test]
    fn malformed_body_is_upstream_error() {
        assert!(matches!(extract_text("not json"), Err(LlmError::Upstream(_))));
    }

    #[test]
    fn missing_key_fails_without_network() {
        // Port 9 on localhost would refuse; the key check must short-circuit first.
        let client = ChatCompletionsClient::new("http://127.0.0.1:9", DEFAULT_MODEL, "  ");
        let options = CompletionOptions {
            max_tokens: 10,
            temperature: 0.1,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(client.complete("s", "u", &options), Err(LlmError::Auth));
    }

    #[test]
    fn timeout_message_mentions_seconds() {
        assert_eq!(
            LlmError::Timeout(120).to_string(),
            "Request timed out after 120s. Please try again."
        );
    }
}
