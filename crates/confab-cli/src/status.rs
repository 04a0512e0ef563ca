//! `confab status` — show configuration and API key state.

use std::path::Path;

use colored::Colorize;

use confab_core::config::{get_config_path, Config};

use crate::helpers::mark;

/// Run the status command.
pub fn run(config: &Config, config_path: Option<&Path>) {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Confab Status".cyan().bold());
    println!();

    println!(
        "  {:<14} {} {}",
        "Config:".bold(),
        config_path.display(),
        mark(config_path.exists(), "(not found, using defaults)")
    );

    let provider = &config.provider;
    println!("  {:<14} {}", "Model:".bold(), provider.model);
    println!(
        "  {:<14} {}",
        "API base:".bold(),
        provider
            .api_base
            .as_deref()
            .unwrap_or(confab_providers::http_provider::DEFAULT_API_BASE)
    );
    println!(
        "  {:<14} {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", provider.temperature).dimmed(),
        provider.timeout_secs
    );

    let key_status = match config.validate() {
        Ok(()) => format!("{} {}", mark(true, ""), provider.masked_key().dimmed()),
        Err(e) => mark(false, &first_line(&e.to_string())),
    };
    println!("  {:<14} {}", "API key:".bold(), key_status);

    println!();
    println!(
        "  {:<14} {} exchanges",
        "History:".bold(),
        config.session.max_history
    );
    let ttl = match config.session.ttl_secs {
        Some(secs) => format!("{secs}s (sweep every {}s)", config.session.sweep_interval_secs),
        None => "never".dimmed().to_string(),
    };
    println!("  {:<14} {}", "Idle expiry:".bold(), ttl);
    println!("  {:<14} {}", "Server:".bold(), config.server.bind_addr());
    println!();
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_of_multiline_error() {
        assert_eq!(first_line("line one\nline two"), "line one");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn run_with_explicit_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        run(&Config::default(), Some(&path));
    }
}
