//! Record store trait.
//!
//! Durable key/value storage for whole serialized records. Each key holds one
//! JSON document that is always rewritten in full.

use async_trait::async_trait;

use crate::error::Result;

/// Key of the session collection record.
pub const SESSIONS_RECORD: &str = "sessions";

/// Key of the settings record.
pub const SETTINGS_RECORD: &str = "settings";

/// Storage backend for serialized records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    async fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes the value stored under `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
