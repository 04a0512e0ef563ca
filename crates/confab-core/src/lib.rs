//! Confab core — turns, sessions, configuration.
//!
//! - **types**: [`Turn`]/[`Role`] and the chat-completions wire structs
//! - **session**: history buffer, session store, idle sweeper
//! - **config**: schema, loader, [`ConfigError`]

pub mod config;
pub mod session;
pub mod types;
pub mod utils;

pub use config::{Config, ConfigError};
pub use session::{History, IdleSweeper, Session, SessionStore};
pub use types::{Role, Turn};
