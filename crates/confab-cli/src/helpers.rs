//! Shared CLI helpers — response printing, banners, status markers.

use colored::Colorize;

use confab_core::types::{Role, Turn};

/// Print an assistant reply to stdout.
pub fn print_response(response: &str) {
    println!();
    if response.is_empty() {
        println!("{} {}", "AI:".cyan().bold(), "(no response)".dimmed());
    } else {
        println!("{} {response}", "AI:".cyan().bold());
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(session_id: &str) {
    let version = env!("CARGO_PKG_VERSION");
    let rule = "=".repeat(50);
    println!();
    println!("{}", rule.dimmed());
    println!("   {}  v{}", "Welcome to Confab!".cyan().bold(), version.dimmed());
    println!("{}", rule.dimmed());
    println!("   {} {}", "session:".dimmed(), session_id);
    print_help();
    println!("Start chatting below!");
    println!("{}", "-".repeat(50).dimmed());
    println!();
}

/// Print the REPL command list.
pub fn print_help() {
    println!();
    println!("{}", "Commands:".bold());
    println!("  /quit or /exit - Exit the chatbot");
    println!("  /clear         - Clear conversation history");
    println!("  /history       - Show conversation history");
    println!("  /help          - Show this help message");
    println!();
}

/// Print a session's turns, one per line.
pub fn print_history(turns: &[Turn]) {
    println!();
    if turns.is_empty() {
        println!("{}", "(no history)".dimmed());
    }
    for turn in turns {
        let label = match turn.role() {
            Role::User => "You:".green().bold(),
            Role::Assistant => "AI:".cyan().bold(),
            Role::System => "System:".dimmed(),
        };
        println!("{label} {}", turn.text());
    }
    println!();
}

pub fn print_goodbye() {
    println!("\n{}\n", "Goodbye! Thanks for chatting.".dimmed());
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Green check or red/dimmed marker for status lines.
pub fn mark(ok: bool, missing: &str) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        missing.red().to_string()
    }
}
