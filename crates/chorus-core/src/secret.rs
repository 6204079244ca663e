//! Secret management service trait.
//!
//! Defines the interface for loading and storing the provider API key.

use crate::config::SecretConfig;
use crate::error::Result;

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration, merged with any environment override.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Persists a newly entered Gemini API key.
    async fn save_api_key(&self, api_key: &str) -> Result<()>;

    /// Returns the Gemini API key if one is available.
    async fn gemini_api_key(&self) -> Result<Option<String>> {
        Ok(self.load_secrets().await?.gemini_api_key().map(str::to_string))
    }
}
