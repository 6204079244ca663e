//! Secret service implementation.
//!
//! Reads the Gemini API key from the environment or from `secret.json`, and
//! stores newly entered keys in that file with owner-only permissions.

use crate::paths::{ChorusPaths, ServiceType};
use crate::storage::AtomicFile;
use chorus_core::config::SecretConfig;
use chorus_core::error::{ChorusError, Result};
use chorus_core::secret::SecretService;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Environment variables consulted before `secret.json`, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Service for managing secret configuration.
///
/// The file contents are cached after the first read; `save_api_key`
/// refreshes the cache.
///
/// # Example
///
/// ```ignore
/// use chorus_infrastructure::SecretServiceImpl;
/// use chorus_core::secret::SecretService;
///
/// let service = SecretServiceImpl::from_paths(&paths);
/// let key = service.gemini_api_key().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    file: AtomicFile,
    env_vars: Vec<String>,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: AtomicFile::private(path.as_ref().to_path_buf()),
            env_vars: API_KEY_ENV_VARS.iter().map(|v| v.to_string()).collect(),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_paths(paths: &ChorusPaths) -> Self {
        Self::new(paths.get_path(ServiceType::Secret))
    }

    /// Replaces the environment variables consulted before the file.
    pub fn with_env_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_vars = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a non-blank API key is available from any source.
    pub async fn has_credential(&self) -> Result<bool> {
        Ok(self.gemini_api_key().await?.is_some())
    }

    fn env_api_key(&self) -> Option<String> {
        self.env_vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }

    async fn file_secrets(&self) -> Result<SecretConfig> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = match self.file.read()? {
            Some(content) => serde_json::from_str(&content).map_err(|e| {
                // The parse error may quote file content, so keep it out.
                ChorusError::Serialization {
                    format: "JSON".to_string(),
                    message: format!(
                        "secret file {} is malformed at line {}",
                        self.file.path().display(),
                        e.line()
                    ),
                }
            })?,
            None => SecretConfig::default(),
        };

        *self.secrets.write().await = Some(loaded.clone());
        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        if let Some(api_key) = self.env_api_key() {
            tracing::debug!("[SecretService] Using API key from environment");
            return Ok(SecretConfig::with_gemini_api_key(api_key));
        }
        self.file_secrets().await
    }

    async fn save_api_key(&self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ChorusError::config("API key must not be empty"));
        }

        let mut secrets = self.file_secrets().await.unwrap_or_default();
        secrets.gemini = Some(chorus_core::config::GeminiConfig {
            api_key: api_key.to_string(),
        });

        self.file.write(&serde_json::to_string_pretty(&secrets)?)?;
        *self.secrets.write().await = Some(secrets);
        tracing::info!("[SecretService] Stored API key in {}", self.file.path().display());
        Ok(())
    }
}
