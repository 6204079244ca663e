//! User settings domain model.

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Feature flags consulted by the dispatcher on every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationFlags {
    /// Route trigger-word submissions to image generation.
    pub use_image_gen: bool,
    /// Attach search grounding to text generation.
    pub use_live_search: bool,
}

impl Default for GenerationFlags {
    fn default() -> Self {
        Self {
            use_image_gen: true,
            use_live_search: true,
        }
    }
}

/// Color scheme preference for front ends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    Light,
    #[default]
    Dark,
    Auto,
}

/// Process-wide user settings.
///
/// Mutated only through the setters below; every setter is followed by a
/// write-through of the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub generation_flags: GenerationFlags,
    /// Opaque local identifier shown as the operator name.
    pub anonymous_id: String,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation_flags: GenerationFlags::default(),
            anonymous_id: generate_anonymous_id(),
            theme: Theme::default(),
        }
    }
}

impl Settings {
    pub fn set_use_image_gen(&mut self, enabled: bool) {
        self.generation_flags.use_image_gen = enabled;
    }

    pub fn set_use_live_search(&mut self, enabled: bool) {
        self.generation_flags.use_live_search = enabled;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

/// `ANON-` followed by five random uppercase alphanumerics.
pub fn generate_anonymous_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("ANON-{}", suffix)
}
