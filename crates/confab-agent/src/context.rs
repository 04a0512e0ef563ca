//! Context builder — assembles the message list for one completion call.
//!
//! Layout: the fixed system prompt, then the session's prior turns, then
//! the new user turn.

use confab_core::types::Turn;

/// The fixed system prompt sent at the head of every request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Have a natural conversation with the user.";

/// Build the full message list for a completion request.
pub fn build_messages(history: &[Turn], user_input: &str) -> Vec<Turn> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Turn::system(SYSTEM_PROMPT));
    messages.extend_from_slice(history);
    messages.push(Turn::user(user_input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::types::Role;

    #[test]
    fn test_build_messages_empty_history() {
        let messages = build_messages(&[], "Hello");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Turn::system(SYSTEM_PROMPT));
        assert_eq!(messages[1], Turn::user("Hello"));
    }

    #[test]
    fn test_build_messages_with_history() {
        let history = vec![Turn::user("Hi"), Turn::assistant("Hello!")];
        let messages = build_messages(&history, "How are you?");

        let roles: Vec<Role> = messages.iter().map(Turn::role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[3].text(), "How are you?");
    }
}
