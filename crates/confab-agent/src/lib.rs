//! Confab Agent — the conversation manager.
//!
//! - **context**: system prompt and message list construction
//! - **manager**: [`ConversationManager`], the single entry point both
//!   transports call, and its [`ChatError`]

pub mod context;
pub mod manager;

pub use context::{build_messages, SYSTEM_PROMPT};
pub use manager::{ChatError, ConversationManager};
