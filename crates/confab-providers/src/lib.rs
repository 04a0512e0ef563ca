//! Completion provider layer for Confab.
//!
//! # Architecture
//!
//! - [`traits::CompletionClient`] — trait the conversation manager calls
//! - [`traits::CompletionError`] — classified provider failures
//! - [`http_provider::HttpProvider`] — OpenAI-compatible HTTP client

pub mod http_provider;
pub mod traits;

// Re-export main types for convenience
pub use http_provider::HttpProvider;
pub use traits::{Completion, CompletionClient, CompletionError};
