//! Per-conversation history buffer with exchange-based trimming.
//!
//! # Unit of trimming
//!
//! An *exchange* starts at every user turn and runs up to (not including)
//! the next user turn, so a normal exchange is `[user, assistant]` and an
//! unanswered user turn is an exchange of its own. Turns that precede the
//! first user turn belong to the first exchange. [`History::trim`] only ever
//! removes whole exchanges, oldest first.

use crate::types::{Role, Turn};

/// Ordered sequence of turns for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the end of the buffer.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drop the oldest exchanges until at most `max_exchanges` remain.
    ///
    /// Returns the number of turns removed.
    pub fn trim(&mut self, max_exchanges: usize) -> usize {
        let exchanges = self.exchanges();
        if exchanges <= max_exchanges {
            return 0;
        }

        if max_exchanges == 0 {
            let removed = self.turns.len();
            self.turns.clear();
            return removed;
        }

        // With max_exchanges >= 1 and more exchanges than that, there are at
        // least `excess + 1` user turns, so the index below is in range.
        let excess = exchanges - max_exchanges;
        let cut = self
            .turns
            .iter()
            .enumerate()
            .filter(|(_, t)| t.role() == Role::User)
            .map(|(i, _)| i)
            .nth(excess)
            .unwrap_or(self.turns.len());

        self.turns.drain(..cut);
        cut
    }

    /// Current turns in chronological order, for the next completion request.
    pub fn as_context(&self) -> &[Turn] {
        &self.turns
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turns (not exchanges).
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of exchanges, as defined in the module docs.
    pub fn exchanges(&self) -> usize {
        if self.turns.is_empty() {
            return 0;
        }
        let users = self
            .turns
            .iter()
            .filter(|t| t.role() == Role::User)
            .count();
        users.max(1)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
