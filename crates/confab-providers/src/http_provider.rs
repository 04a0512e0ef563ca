//! HTTP completion client for OpenAI-compatible APIs.
//!
//! Talks directly to `{api_base}/chat/completions` with bearer auth and
//! classifies every failure into a [`CompletionError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error, warn};

use confab_core::config::ProviderConfig;
use confab_core::types::{ChatCompletionRequest, ChatCompletionResponse, Turn};

use crate::traits::{Completion, CompletionClient, CompletionError};

/// Default API base when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A completion client that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider from the `provider` config section.
    pub fn new(config: &ProviderConfig) -> reqwest::Result<Self> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout = config.timeout();

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(HttpProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn classify_send_error(&self, e: reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Timeout(self.timeout.as_secs())
        } else {
            CompletionError::Network(e.to_string())
        }
    }
}

/// Pull `error.message` out of an OpenAI-style error body, or return the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl CompletionClient for HttpProvider {
    async fn complete(&self, messages: &[Turn]) -> Result<Completion, CompletionError> {
        debug!(model = %self.model, messages = messages.len(), "Calling LLM");

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                self.classify_send_error(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read response body");
            self.classify_send_error(e)
        })?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(status = %status, "Rate limited by provider");
            return Err(CompletionError::RateLimited(error_message(&body)));
        }
        if !status.is_success() {
            error!(status = %status, body = %body, "API error");
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse LLM response");
            CompletionError::MalformedResponse(e.to_string())
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("no choices in response".into()))?;

        let content = choice.message.content.ok_or_else(|| {
            CompletionError::MalformedResponse("response has no message content".into())
        })?;

        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("?"),
            total_tokens = parsed.usage.as_ref().map_or(0, |u| u.total_tokens),
            "LLM response received"
        );

        Ok(Completion {
            content,
            finish_reason: choice.finish_reason,
            usage: parsed.usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(api_key: &str, api_base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            api_base: api_base.map(String::from),
            ..ProviderConfig::default()
        }
    }

    fn ok_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let config = make_config("key", Some("https://api.openai.com/v1/"));
        let provider = HttpProvider::new(&config).unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base() {
        let provider = HttpProvider::new(&make_config("key", None)).unwrap();
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error": {"message": "Rate limit exceeded", "type": "rate_limit_error"}}"#;
        assert_eq!(error_message(body), "Rate limit exceeded");
        assert_eq!(error_message("plain text"), "plain text");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("Hello there!")))
            .mount(&mock_server)
            .await;

        let config = make_config("test-key-123", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config).unwrap();

        let messages = vec![Turn::system("You are helpful."), Turn::user("Hello")];
        let completion = provider.complete(&messages).await.unwrap();

        assert_eq!(completion.content, "Hello there!");
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_complete_sends_correct_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "test" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("ok")))
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config).unwrap();

        let messages = vec![Turn::system("sys"), Turn::user("test")];
        // If the body matcher fails, wiremock returns 404 → we'd get an error
        let completion = provider.complete(&messages).await.unwrap();
        assert_eq!(completion.content, "ok");
    }

    #[tokio::test]
    async fn test_complete_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit exceeded", "type": "rate_limit_error" }
            })))
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config).unwrap();

        let err = provider.complete(&[Turn::user("Hello")]).await.unwrap_err();
        assert!(err.is_rate_limit());
        assert!(err.to_string().contains("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config).unwrap();

        match provider.complete(&[Turn::user("Hello")]).await {
            Err(CompletionError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_no_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "x", "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config).unwrap();

        let err = provider.complete(&[Turn::user("Hello")]).await.unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_invalid_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config).unwrap();

        let err = provider.complete(&[Turn::user("Hello")]).await.unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_network_error() {
        // Point to a port that's not listening
        let config = make_config("key", Some("http://127.0.0.1:1"));
        let provider = HttpProvider::new(&config).unwrap();

        let err = provider.complete(&[Turn::user("Hello")]).await.unwrap_err();
        assert!(matches!(err, CompletionError::Network(_)));
    }

    #[tokio::test]
    async fn test_complete_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let config = ProviderConfig {
            timeout_secs: 1,
            ..make_config("key", Some(&mock_server.uri()))
        };
        let provider = HttpProvider::new(&config).unwrap();

        let err = provider.complete(&[Turn::user("Hello")]).await.unwrap_err();
        assert!(matches!(err, CompletionError::Timeout(1)));
    }
}
