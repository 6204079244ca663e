//! Provider capability contract.
//!
//! The dispatcher only ever talks to a provider through this trait. One
//! implementation is built per credential and shared behind an `Arc`.

use crate::session::{Citation, MessageRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One role/content pair of the context window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTurn {
    pub role: MessageRole,
    pub text: String,
}

/// Input for a text generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub system_instruction: String,
    pub contents: Vec<ContextTurn>,
    /// Attach the provider's search-grounding capability.
    pub grounding_enabled: bool,
    pub temperature: f32,
}

/// Output of a text generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextResponse {
    /// `None` when the provider answered without any text.
    pub text: Option<String>,
    /// Grounding sources, in provider order.
    pub citations: Vec<Citation>,
}

/// Aspect ratios understood by image generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Wide => "16:9",
        }
    }
}

/// Input for an image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// Inline binary image data, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: Option<String>,
    pub data: String,
}

/// One content part of an image generation response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePart {
    pub text: Option<String>,
    pub inline_image: Option<InlineImage>,
}

/// Output of an image generation call. Part order is provider-defined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageResponse {
    pub parts: Vec<ImagePart>,
}

/// Provider-defined failure signal: an optional HTTP-like status plus text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider failure (status: {status:?}): {message}")]
pub struct FailureSignal {
    pub status: Option<u16>,
    pub message: String,
}

impl FailureSignal {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A failure that never reached the provider (DNS, refused, timeout).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(Some(status), message)
    }
}

/// External generative text/image capability.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generates a text reply for the given context.
    async fn generate_text(&self, request: TextRequest) -> Result<TextResponse, FailureSignal>;

    /// Generates an image from a prompt.
    async fn generate_image(&self, request: ImageRequest)
    -> Result<ImageResponse, FailureSignal>;
}
