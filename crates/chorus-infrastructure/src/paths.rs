//! Unified path management for chorus files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chorus/            # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys (mode 600)
//! └── data/                    # Record directory (overridable)
//!     ├── sessions.json        # Session collection record
//!     └── settings.json        # Settings record
//! ```

use chorus_core::error::{ChorusError, Result};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "chorus";
const DATA_DIR_NAME: &str = "data";

/// Files and directories managed by chorus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    Secret,
    /// Directory holding one JSON file per record key.
    Records,
}

/// Resolved locations for one chorus installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChorusPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl ChorusPaths {
    /// Resolves paths under `base_path`, or under the platform config
    /// directory (`~/.config/chorus` on Linux) when `None`.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let config_dir = match base_path {
            Some(base) => base.to_path_buf(),
            None => dirs::config_dir()
                .ok_or_else(|| ChorusError::config("Cannot find home directory"))?
                .join(APP_DIR_NAME),
        };
        let data_dir = config_dir.join(DATA_DIR_NAME);
        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Overrides the record directory.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn get_path(&self, service: ServiceType) -> PathBuf {
        match service {
            ServiceType::Config => self.config_dir.join("config.toml"),
            ServiceType::Secret => self.config_dir.join("secret.json"),
            ServiceType::Records => self.data_dir.clone(),
        }
    }
}
