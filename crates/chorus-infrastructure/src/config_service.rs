//! Configuration service implementation.
//!
//! Loads `ChorusConfig` from `config.toml`, writing the defaults out on first
//! run so users have a file to edit.

use crate::paths::{ChorusPaths, ServiceType};
use crate::storage::AtomicFile;
use chorus_core::config::ChorusConfig;
use chorus_core::error::Result;
use std::path::{Path, PathBuf};

/// Configuration service backed by a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicFile,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }

    pub fn from_paths(paths: &ChorusPaths) -> Self {
        Self::new(paths.get_path(ServiceType::Config))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the configuration.
    ///
    /// A missing or blank file yields the defaults, which are written back.
    /// A malformed or out-of-range file is an error; it is never overwritten.
    pub fn load_or_create(&self) -> Result<ChorusConfig> {
        match self.file.read()? {
            Some(content) => {
                let config = ChorusConfig::from_toml_str(&content)?;
                tracing::debug!("[ConfigService] Loaded {}", self.path().display());
                Ok(config)
            }
            None => {
                let config = ChorusConfig::default();
                self.save(&config)?;
                tracing::info!(
                    "[ConfigService] Wrote default configuration to {}",
                    self.path().display()
                );
                Ok(config)
            }
        }
    }

    pub fn save(&self, config: &ChorusConfig) -> Result<()> {
        config.validate()?;
        self.file.write(&config.to_toml_string()?)
    }
}
