//! Mutable application state.

use chorus_core::session::{ChatSession, SessionStore};
use chorus_core::settings::Settings;

/// Everything the chat loop mutates, owned by `ChatUseCase`.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub store: SessionStore,
    pub settings: Settings,
}

impl ChatState {
    pub fn active_session(&self) -> Option<&ChatSession> {
        self.store.active_session()
    }
}
