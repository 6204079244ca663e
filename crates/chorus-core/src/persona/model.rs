//! Persona domain model.
//!
//! A persona is a fixed response-style profile. Sessions reference personas by
//! id; the persona itself never changes at runtime.

use serde::{Deserialize, Serialize};

/// A named response-style profile selectable per session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Stable identifier referenced by persisted sessions
    pub id: String,
    /// Display name of the persona
    pub display_name: String,
    /// System-level directive sent with every text generation call
    pub style_instruction: String,
    /// Accent color used by front ends (e.g. "blue")
    pub color_tag: String,
    /// Text of the seed message that opens every new session
    pub greeting: String,
}

impl Persona {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        style_instruction: impl Into<String>,
        color_tag: impl Into<String>,
        greeting: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            style_instruction: style_instruction.into(),
            color_tag: color_tag.into(),
            greeting: greeting.into(),
        }
    }
}
