//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use confab_agent::ConversationManager;
use confab_core::utils::get_history_path;

use crate::helpers;

/// One line of REPL input, classified.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    Clear,
    History,
    Help,
    Message(&'a str),
}

/// Classify a raw line. Commands are case-insensitive.
fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    match trimmed.to_lowercase().as_str() {
        "/quit" | "/exit" => Input::Quit,
        "/clear" => Input::Clear,
        "/history" => Input::History,
        "/help" => Input::Help,
        _ => Input::Message(trimmed),
    }
}

/// Run the interactive REPL loop against one session.
pub async fn run(manager: &ConversationManager, session_id: &str) -> Result<()> {
    helpers::print_banner(session_id);

    let mut editor = create_editor()?;

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                helpers::print_goodbye();
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let input = parse_input(&line);
        if input != Input::Empty {
            let _ = editor.add_history_entry(line.trim());
        }

        match input {
            Input::Empty => continue,
            Input::Quit => {
                helpers::print_goodbye();
                break;
            }
            Input::Clear => {
                manager.reset_history(session_id).await;
                println!("\nConversation history cleared.\n");
            }
            Input::History => {
                let turns = manager.history(session_id).await.unwrap_or_default();
                helpers::print_history(&turns);
            }
            Input::Help => helpers::print_help(),
            Input::Message(text) => {
                debug!(session = session_id, "processing input");
                helpers::print_thinking();
                let reply = manager
                    .send_message(session_id, text)
                    .await
                    .unwrap_or_else(|e| e.reply_text());
                helpers::clear_thinking();
                helpers::print_response(&reply);
            }
        }
    }

    save_history(&mut editor);
    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let path = history_file();
    if path.exists() {
        let _ = editor.load_history(&path);
        debug!("loaded REPL history from {}", path.display());
    }

    Ok(editor)
}

/// Save line history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_file();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_file() -> std::path::PathBuf {
    get_history_path().join("cli_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_commands() {
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/EXIT"), Input::Quit);
        assert_eq!(parse_input("  /exit  "), Input::Quit);
    }

    #[test]
    fn bare_words_are_messages() {
        assert_eq!(parse_input("exit"), Input::Message("exit"));
        assert_eq!(parse_input("  hello there "), Input::Message("hello there"));
    }

    #[test]
    fn other_commands() {
        assert_eq!(parse_input("/clear"), Input::Clear);
        assert_eq!(parse_input("/History"), Input::History);
        assert_eq!(parse_input("/help"), Input::Help);
    }

    #[test]
    fn blank_lines() {
        assert_eq!(parse_input(""), Input::Empty);
        assert_eq!(parse_input("   \t"), Input::Empty);
    }

    #[test]
    fn history_file_under_data_dir() {
        let path = history_file();
        assert!(path.to_string_lossy().contains(".confab"));
        assert!(path.ends_with("history/cli_history"));
    }
}
