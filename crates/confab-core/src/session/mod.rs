//! Session state — per-conversation history buffers and the store that owns them.
//!
//! - [`history::History`] — ordered turns with exchange-based trimming
//! - [`store::SessionStore`] — id → session map with atomic get-or-create
//! - [`sweeper::IdleSweeper`] — optional TTL eviction of idle sessions
//!
//! Nothing here is persisted: all sessions are lost when the process exits.

pub mod history;
pub mod store;
pub mod sweeper;

pub use history::History;
pub use store::{Session, SessionStore};
pub use sweeper::IdleSweeper;
