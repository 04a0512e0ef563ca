//! Config loader — reads `~/.confab/config.json`, then `.env`, then the
//! process environment.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.confab/config.json` (or an explicit path)
//! 3. `.env` in the working directory (does not override variables already set)
//! 4. Environment variables (override JSON)

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::schema::Config;
use super::ConfigError;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default (or given) path, `.env` and env vars.
///
/// A missing or unparsable config file falls back to defaults; an env var
/// with an unparsable value is an error. The result is not validated — call
/// [`Config::validate`] before serving traffic.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match dotenvy::dotenv() {
        Ok(env_path) => debug!("Loaded environment from {}", env_path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config_file(&config_path);
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Load config from a specific file path, falling back to defaults.
fn load_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Apply environment overrides on top of a loaded config.
///
/// Supported variables:
/// - `OPENAI_API_KEY` → `provider.api_key`
/// - `OPENAI_API_BASE` → `provider.api_base`
/// - `MODEL_NAME` → `provider.model`
/// - `MAX_HISTORY` → `session.max_history`
/// - `CONFAB_PROVIDER__TEMPERATURE` → `provider.temperature`
/// - `CONFAB_PROVIDER__MAX_TOKENS` → `provider.max_tokens`
/// - `CONFAB_PROVIDER__TIMEOUT_SECS` → `provider.timeout_secs`
/// - `CONFAB_SESSION__TTL_SECS` → `session.ttl_secs`
/// - `CONFAB_SESSION__SWEEP_INTERVAL_SECS` → `session.sweep_interval_secs`
/// - `CONFAB_SERVER__HOST` → `server.host`
/// - `CONFAB_SERVER__PORT` → `server.port`
fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Provider
    if let Some(val) = lookup("OPENAI_API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = lookup("OPENAI_API_BASE") {
        config.provider.api_base = Some(val);
    }
    if let Some(val) = lookup("MODEL_NAME") {
        config.provider.model = val;
    }
    if let Some(t) = parse_var(&lookup, "CONFAB_PROVIDER__TEMPERATURE")? {
        config.provider.temperature = t;
    }
    if let Some(n) = parse_var(&lookup, "CONFAB_PROVIDER__MAX_TOKENS")? {
        config.provider.max_tokens = Some(n);
    }
    if let Some(n) = parse_var(&lookup, "CONFAB_PROVIDER__TIMEOUT_SECS")? {
        config.provider.timeout_secs = n;
    }

    // Sessions
    if let Some(n) = parse_var(&lookup, "MAX_HISTORY")? {
        config.session.max_history = n;
    }
    if let Some(n) = parse_var(&lookup, "CONFAB_SESSION__TTL_SECS")? {
        config.session.ttl_secs = Some(n);
    }
    if let Some(n) = parse_var(&lookup, "CONFAB_SESSION__SWEEP_INTERVAL_SECS")? {
        config.session.sweep_interval_secs = n;
    }

    // Server
    if let Some(val) = lookup("CONFAB_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(p) = parse_var(&lookup, "CONFAB_SERVER__PORT")? {
        config.server.port = p;
    }

    Ok(config)
}

/// Read and parse one variable. Unset or empty → `Ok(None)`.
fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_file(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.session.max_history, 10);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "provider": {
                "model": "gpt-4o",
                "apiBase": "https://proxy.example.com/v1"
            },
            "session": { "maxHistory": 4, "ttlSecs": 900 }
        }"#,
        );

        let config = load_config_file(file.path());
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(
            config.provider.api_base.as_deref(),
            Some("https://proxy.example.com/v1")
        );
        assert_eq!(config.session.max_history, 4);
        assert_eq!(config.session.ttl_secs, Some(900));
        // Default preserved
        assert_eq!(config.provider.temperature, 0.7);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_file(file.path());
        assert_eq!(config.provider.model, "gpt-4o-mini");
    }

    #[test]
    fn test_env_overrides_openai_names() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("OPENAI_API_KEY", "sk-env-key"),
                ("MODEL_NAME", "gpt-4o"),
                ("MAX_HISTORY", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.provider.api_key, "sk-env-key");
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.session.max_history, 3);
    }

    #[test]
    fn test_env_overrides_prefixed_names() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("CONFAB_SERVER__PORT", "9999"),
                ("CONFAB_SERVER__HOST", "127.0.0.1"),
                ("CONFAB_SESSION__TTL_SECS", "120"),
                ("CONFAB_PROVIDER__TIMEOUT_SECS", "5"),
                ("CONFAB_PROVIDER__TEMPERATURE", "0.2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.bind_addr(), "127.0.0.1:9999");
        assert_eq!(config.session.ttl_secs, Some(120));
        assert_eq!(config.provider.timeout_secs, 5);
        assert_eq!(config.provider.temperature, 0.2);
    }

    #[test]
    fn test_env_invalid_number_is_error() {
        let err = apply_env_overrides(Config::default(), env(&[("MAX_HISTORY", "ten")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { name, value, .. } => {
                assert_eq!(name, "MAX_HISTORY");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_empty_value_ignored() {
        let config =
            apply_env_overrides(Config::default(), env(&[("MAX_HISTORY", "  ")])).unwrap();
        assert_eq!(config.session.max_history, 10);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file = write_temp_json(r#"{ "provider": { "model": "from-file" } }"#);
        let config = apply_env_overrides(
            load_config_file(file.path()),
            env(&[("MODEL_NAME", "from-env")]),
        )
        .unwrap();
        assert_eq!(config.provider.model, "from-env");
    }
}
