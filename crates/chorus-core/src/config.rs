//! Application configuration.
//!
//! `ChorusConfig` is read from `config.toml`; every field has a default so a
//! partial (or empty) file is valid. Secrets live separately in `secret.json`.

use crate::error::{ChorusError, Result};
use crate::generation::{
    AspectRatio, DEFAULT_CONTEXT_WINDOW, DEFAULT_TEMPERATURE, DispatchConfig, ImageFallback,
    TriggerVocabulary,
};
use crate::persona::DEFAULT_PERSONA_ID;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChorusConfig {
    /// Persona used for bootstrap sessions and `/new` without an argument.
    pub default_persona: String,
    pub generation: GenerationConfig,
    pub provider: ProviderConfig,
    pub storage: StorageConfig,
}

impl Default for ChorusConfig {
    fn default() -> Self {
        Self {
            default_persona: DEFAULT_PERSONA_ID.to_string(),
            generation: GenerationConfig::default(),
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub context_window: usize,
    pub temperature: f32,
    pub image_fallback: ImageFallback,
    pub aspect_ratio: AspectRatio,
    pub trigger_words: TriggerVocabulary,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            temperature: DEFAULT_TEMPERATURE,
            image_fallback: ImageFallback::default(),
            aspect_ratio: AspectRatio::default(),
            trigger_words: TriggerVocabulary::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub text_model: String,
    pub image_model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the directory holding the session and settings records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl ChorusConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.default_persona.trim().is_empty() {
            return Err(ChorusError::config("default_persona must not be empty"));
        }
        if self.generation.context_window == 0 {
            return Err(ChorusError::config(
                "generation.context_window must be at least 1",
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ChorusError::config(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ChorusError::config("provider.timeout_secs must be positive"));
        }
        if self.provider.text_model.trim().is_empty() || self.provider.image_model.trim().is_empty()
        {
            return Err(ChorusError::config("provider model names must not be empty"));
        }
        Ok(())
    }

    pub fn to_dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            context_window: self.generation.context_window,
            temperature: self.generation.temperature,
            image_fallback: self.generation.image_fallback,
            aspect_ratio: self.generation.aspect_ratio,
            triggers: self.generation.trigger_words.clone(),
        }
    }
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
}

impl SecretConfig {
    /// The configured key, ignoring blank values.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .map(|g| g.api_key.trim())
            .filter(|key| !key.is_empty())
    }

    pub fn with_gemini_api_key(api_key: impl Into<String>) -> Self {
        Self {
            gemini: Some(GeminiConfig {
                api_key: api_key.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ChorusConfig::from_toml_str("").unwrap();
        assert_eq!(config, ChorusConfig::default());
        assert_eq!(config.default_persona, "sage");
        assert_eq!(config.generation.context_window, 10);
        assert_eq!(config.provider.text_model, DEFAULT_TEXT_MODEL);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_partial_document() {
        let config = ChorusConfig::from_toml_str(
            r#"
default_persona = "muse"

[generation]
context_window = 6
image_fallback = "disabled"
trigger_words = ["Sketch", "paint"]

[provider]
timeout_secs = 15
"#,
        )
        .unwrap();

        assert_eq!(config.default_persona, "muse");
        assert_eq!(config.generation.context_window, 6);
        assert_eq!(config.generation.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.provider.timeout_secs, 15);
        assert_eq!(config.provider.image_model, DEFAULT_IMAGE_MODEL);

        let dispatch = config.to_dispatch_config();
        assert_eq!(dispatch.context_window, 6);
        assert_eq!(dispatch.image_fallback, ImageFallback::Disabled);
        assert!(dispatch.triggers.matches("please SKETCH a fox"));
        assert!(!dispatch.triggers.matches("draw a fox"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = ChorusConfig::from_toml_str("[generation]\ncontext_window = 0\n").unwrap_err();
        assert!(matches!(err, ChorusError::Config(_)));

        let err = ChorusConfig::from_toml_str("[generation]\ntemperature = 3.5\n").unwrap_err();
        assert!(matches!(err, ChorusError::Config(_)));

        let err = ChorusConfig::from_toml_str("[provider]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ChorusError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let err = ChorusConfig::from_toml_str("default_persona = ").unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let config = ChorusConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(ChorusConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_secret_config_ignores_blank_key() {
        let secrets: SecretConfig = serde_json::from_str(r#"{"gemini":{"api_key":"  "}}"#).unwrap();
        assert_eq!(secrets.gemini_api_key(), None);
        let secrets = SecretConfig::with_gemini_api_key("abc");
        assert_eq!(secrets.gemini_api_key(), Some("abc"));
        assert_eq!(SecretConfig::default().gemini_api_key(), None);
    }
}
