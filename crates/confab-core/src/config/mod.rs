//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use confab_core::config;
//!
//! let cfg = config::load_config(None).expect("bad environment");
//! cfg.validate().expect("missing API key");
//! println!("Model: {}", cfg.provider.model);
//! ```

pub mod loader;
pub mod schema;

use thiserror::Error;

// Re-export key types
pub use loader::{get_config_path, load_config};
pub use schema::{Config, ProviderConfig, ServerConfig, SessionConfig, PLACEHOLDER_API_KEY};

/// Fatal configuration problems, reported before any traffic is served.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "OPENAI_API_KEY not found. Set it in your environment or .env file.\n\
         Get your API key at: https://platform.openai.com/api-keys"
    )]
    MissingApiKey,

    #[error(
        "OPENAI_API_KEY is still the placeholder value. Replace it with your actual OpenAI API key.\n\
         Get your API key at: https://platform.openai.com/api-keys"
    )]
    PlaceholderApiKey,

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}
