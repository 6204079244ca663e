//! Interactive credential source for the terminal.

use async_trait::async_trait;
use chorus_core::credential::CredentialSource;
use chorus_core::error::{ChorusError, Result};
use chorus_core::secret::SecretService;
use chorus_infrastructure::SecretServiceImpl;
use rustyline::DefaultEditor;
use std::sync::Arc;

/// Prompts for an API key on the terminal and stores it in `secret.json`.
pub struct TerminalKeyPrompt {
    secrets: Arc<SecretServiceImpl>,
}

impl TerminalKeyPrompt {
    pub fn new(secrets: Arc<SecretServiceImpl>) -> Self {
        Self { secrets }
    }
}

#[async_trait]
impl CredentialSource for TerminalKeyPrompt {
    async fn has_credential(&self) -> Result<bool> {
        self.secrets.has_credential().await
    }

    async fn request_credential_selection(&self) -> Result<()> {
        let entered = tokio::task::spawn_blocking(|| -> Result<String> {
            let mut editor = DefaultEditor::new()
                .map_err(|e| ChorusError::internal(format!("Failed to open prompt: {}", e)))?;
            editor
                .readline("Gemini API key: ")
                .map_err(|e| ChorusError::security(format!("No API key entered: {}", e)))
        })
        .await
        .map_err(|e| ChorusError::internal(format!("Prompt task failed: {}", e)))??;

        self.secrets.save_api_key(&entered).await
    }
}
