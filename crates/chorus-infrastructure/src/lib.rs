//! Infrastructure layer: file locations, record stores, configuration and
//! secrets.

pub mod config_service;
pub mod file_record_store;
pub mod memory_record_store;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_record_store::FileRecordStore;
pub use crate::memory_record_store::InMemoryRecordStore;
pub use crate::paths::{ChorusPaths, ServiceType};
pub use crate::secret_service::{API_KEY_ENV_VARS, SecretServiceImpl};
