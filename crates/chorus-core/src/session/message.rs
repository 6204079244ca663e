//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message produced by the persona (including seed and failure turns).
    Model,
}

/// A source reference returned alongside a search-grounded response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// A single message in a session.
///
/// Messages are immutable once created; sessions only ever append them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier within the session (UUID format).
    pub id: String,
    /// The author of the message.
    pub role: MessageRole,
    /// The text content of the message.
    pub content: String,
    /// Data URI of a generated image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Grounding sources in the order the provider returned them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(role: MessageRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            image_url: None,
            citations: None,
            timestamp,
        }
    }

    pub(crate) fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub(crate) fn with_citations(mut self, citations: Option<Vec<Citation>>) -> Self {
        self.citations = citations.filter(|c| !c.is_empty());
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
