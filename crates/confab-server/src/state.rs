//! Shared handler state.

use std::sync::{Arc, OnceLock};

use confab_agent::ConversationManager;

use crate::error::ApiError;

/// State cloned into every handler.
///
/// The manager lives in a write-once slot so the listener can come up
/// before startup finishes; until [`AppState::install`] runs, every route
/// except `/ping` answers 503.
#[derive(Clone, Default)]
pub struct AppState {
    manager: Arc<OnceLock<Arc<ConversationManager>>>,
}

impl AppState {
    /// State with an empty slot.
    pub fn pending() -> Self {
        Self::default()
    }

    /// State with the manager already installed.
    pub fn ready(manager: Arc<ConversationManager>) -> Self {
        let state = Self::default();
        state.install(manager);
        state
    }

    /// Fill the slot. Returns `false` if a manager was already installed.
    pub fn install(&self, manager: Arc<ConversationManager>) -> bool {
        self.manager.set(manager).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.manager.get().is_some()
    }

    pub(crate) fn manager(&self) -> Result<&Arc<ConversationManager>, ApiError> {
        self.manager.get().ok_or(ApiError::Uninitialized)
    }
}
