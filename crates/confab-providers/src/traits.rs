//! Completion client trait — the seam between the conversation manager and
//! the text-generation provider.

use async_trait::async_trait;
use thiserror::Error;

use confab_core::types::{Turn, UsageInfo};

/// A successful completion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Completion {
    /// Generated assistant text.
    pub content: String,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Completion {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Classified provider failure.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Provider throttled the request (HTTP 429).
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// Non-success status other than 429.
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Connection, DNS, or TLS failure before a response arrived.
    #[error("request failed: {0}")]
    Network(String),

    /// No response within the allotted time.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Response arrived but could not be used (bad JSON, no choices, no content).
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, CompletionError::RateLimited(_))
    }
}

/// A text-generation backend.
///
/// The main implementation is [`crate::HttpProvider`], which talks to any
/// OpenAI-compatible `/chat/completions` endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate the next assistant turn for `messages`.
    ///
    /// `messages` is the full context window: system prompt, prior turns,
    /// and the new user turn, in order.
    async fn complete(&self, messages: &[Turn]) -> Result<Completion, CompletionError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
