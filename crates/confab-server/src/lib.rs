//! Confab Server — HTTP endpoints over the conversation manager.
//!
//! - **state**: shared [`AppState`] with the readiness slot
//! - **error**: [`ApiError`] and its status-code mapping
//! - **routes**: router and handlers
//! - **server**: bind, serve, graceful shutdown

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use server::run_server;
pub use state::AppState;
