//! Session domain model.

use super::message::{Message, MessageRole};
use crate::persona::Persona;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title every session carries until its first user message.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Number of characters of the first user message kept as the session title.
pub const TITLE_MAX_CHARS: usize = 25;

/// A persisted, append-only conversation bound to one persona at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Persona currently answering in this session
    pub persona_id: String,
    /// Human-readable session title
    pub title: String,
    /// Messages in insertion order
    pub messages: Vec<Message>,
    /// Timestamp of the last mutation
    pub last_updated: DateTime<Utc>,
}

impl ChatSession {
    /// Creates a session holding the persona's seed message.
    pub fn new(persona: &Persona) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            persona_id: persona.id.clone(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: vec![Message::new(MessageRole::Model, persona.greeting.clone(), now)],
            last_updated: now,
        }
    }

    /// Restores the seed message on a session that lost all of its messages.
    /// Returns whether anything changed.
    pub fn ensure_seeded(&mut self, persona: &Persona) -> bool {
        if !self.messages.is_empty() {
            return false;
        }
        let seed = Message::new(MessageRole::Model, persona.greeting.clone(), self.last_updated);
        self.messages.push(seed);
        true
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }

    /// True while the session holds nothing but its seed message.
    pub fn is_pristine(&self) -> bool {
        self.messages.len() <= 1
    }

    /// Timestamp for the next message, never earlier than the last one.
    pub(crate) fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.last_updated = message.timestamp;
        self.messages.push(message);
    }
}

/// Builds a title from the first `TITLE_MAX_CHARS` characters of `text`.
pub(crate) fn title_from(text: &str) -> String {
    let title: String = text.trim().chars().take(TITLE_MAX_CHARS).collect();
    let title = title.trim_end();
    if title.is_empty() {
        DEFAULT_SESSION_TITLE.to_string()
    } else {
        title.to_string()
    }
}
