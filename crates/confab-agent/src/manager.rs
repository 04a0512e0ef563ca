//! Conversation manager — routes a (session id, message) pair to its
//! history, calls the completion client with that context, and records the
//! exchange.
//!
//! # Locking
//!
//! A `send_message` holds the session's history lock from the pre-call trim
//! until the final append, *including* the completion call. Concurrent
//! messages on one session therefore run one after another and each sees
//! the previous exchange; messages on different sessions never wait on each
//! other. The hold time is bounded by `request_timeout`.
//!
//! # Failed calls
//!
//! The user turn is appended before the completion call, so it survives a
//! failed, timed-out or cancelled call; the assistant turn is appended only
//! on success. An unanswered user turn counts as its own
//! exchange for trimming (see [`confab_core::session::history`]).

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use confab_core::config::Config;
use confab_core::session::SessionStore;
use confab_core::types::Turn;
use confab_core::utils::truncate_string;
use confab_providers::{CompletionClient, CompletionError};

use crate::context::build_messages;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Why a message could not be answered.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Message was empty or whitespace-only. Nothing was recorded.
    #[error("Message cannot be empty")]
    EmptyInput,

    /// Provider throttled the request; safe to retry later.
    #[error("rate limit reached: {0}")]
    RateLimited(String),

    /// Any other provider failure, including timeouts.
    #[error(transparent)]
    Provider(CompletionError),
}

impl ChatError {
    /// Short machine-readable tag for transports.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::EmptyInput => "empty_input",
            ChatError::RateLimited(_) => "rate_limit",
            ChatError::Provider(_) => "provider",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::EmptyInput => false,
            ChatError::RateLimited(_) => true,
            ChatError::Provider(e) => {
                matches!(e, CompletionError::Timeout(_) | CompletionError::Network(_))
            }
        }
    }

    /// Text shown in place of a reply by console transports.
    pub fn reply_text(&self) -> String {
        match self {
            ChatError::EmptyInput => "Error: Message cannot be empty.".to_string(),
            ChatError::RateLimited(_) => {
                "Error: Rate limit reached. Please try again later.".to_string()
            }
            ChatError::Provider(e) => format!("Error: API error occurred - {e}"),
        }
    }
}

impl From<CompletionError> for ChatError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::RateLimited(msg) => ChatError::RateLimited(msg),
            other => ChatError::Provider(other),
        }
    }
}

// ─────────────────────────────────────────────
// ConversationManager
// ─────────────────────────────────────────────

/// Owns the session store and the completion client.
///
/// Construct once at startup and share behind an `Arc`.
pub struct ConversationManager {
    store: Arc<SessionStore>,
    client: Arc<dyn CompletionClient>,
    /// Maximum exchanges kept per session.
    max_history: usize,
    /// Upper bound on a single completion call.
    request_timeout: Duration,
}

impl std::fmt::Debug for ConversationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationManager")
            .field("model", &self.client.model())
            .field("max_history", &self.max_history)
            .field("request_timeout", &self.request_timeout)
            .field("sessions", &self.store.len())
            .finish()
    }
}

impl ConversationManager {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        max_history: usize,
        request_timeout: Duration,
    ) -> Self {
        info!(
            model = client.model(),
            provider = client.display_name(),
            max_history,
            timeout_s = request_timeout.as_secs(),
            "conversation manager initialized"
        );
        Self {
            store: Arc::new(SessionStore::new()),
            client,
            max_history,
            request_timeout,
        }
    }

    /// Build a manager from the loaded configuration.
    pub fn from_config(config: &Config, client: Arc<dyn CompletionClient>) -> Self {
        Self::new(
            client,
            config.session.max_history,
            config.provider.timeout(),
        )
    }

    /// Send a user message on `session_id` and return the assistant's reply.
    ///
    /// Unseen session ids are created on the fly.
    pub async fn send_message(&self, session_id: &str, message: &str) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let session = self.store.get_or_create(session_id);
        let mut history = session.lock_history().await;
        history.trim(self.max_history);

        let messages = build_messages(history.as_context(), message);
        // Recorded before the await: a dropped request still leaves its question.
        history.append(Turn::user(message));
        history.trim(self.max_history);
        debug!(
            session = %session_id,
            context_turns = messages.len(),
            preview = %truncate_string(message, 60),
            "sending message"
        );

        let result =
            match tokio::time::timeout(self.request_timeout, self.client.complete(&messages)).await
            {
                Ok(result) => result.map_err(ChatError::from),
                Err(_) => Err(ChatError::Provider(CompletionError::Timeout(
                    self.request_timeout.as_secs(),
                ))),
            };

        match result {
            Ok(completion) => {
                history.append(Turn::assistant(completion.content.as_str()));
                history.trim(self.max_history);
                debug!(
                    session = %session_id,
                    exchanges = history.exchanges(),
                    "exchange recorded"
                );
                Ok(completion.content)
            }
            Err(e) => {
                history.trim(self.max_history);
                warn!(session = %session_id, kind = e.kind(), error = %e, "completion failed");
                Err(e)
            }
        }
    }

    /// Delete a session entirely. Returns `true` if it existed.
    pub fn clear_session(&self, session_id: &str) -> bool {
        let existed = self.store.delete(session_id);
        info!(session = %session_id, existed, "session cleared");
        existed
    }

    /// Ids of all live sessions, sorted.
    pub fn list_sessions(&self) -> Vec<String> {
        self.store.list_ids()
    }

    /// Snapshot of a session's turns, or `None` if the session does not exist.
    pub async fn history(&self, session_id: &str) -> Option<Vec<Turn>> {
        let session = self.store.get(session_id)?;
        let history = session.lock_history().await;
        Some(history.as_context().to_vec())
    }

    /// Empty a session's history but keep the session. Returns `false` if absent.
    pub async fn reset_history(&self, session_id: &str) -> bool {
        match self.store.get(session_id) {
            Some(session) => {
                session.lock_history().await.clear();
                true
            }
            None => false,
        }
    }

    /// Shared handle to the underlying store (for the idle sweeper).
    pub fn store(&self) -> Arc<SessionStore> {
        self.store.clone()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
