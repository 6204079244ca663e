//! Persistence adapter.
//!
//! Mirrors the session collection and the settings to a `RecordStore` as two
//! whole-document JSON records. Loading never fails: records that are missing
//! or unreadable are replaced by a bootstrap state.

use crate::state::ChatState;
use chorus_core::error::Result;
use chorus_core::persona::PersonaRegistry;
use chorus_core::record::{RecordStore, SESSIONS_RECORD, SETTINGS_RECORD};
use chorus_core::session::{ChatSession, SessionStore};
use chorus_core::settings::Settings;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Clone)]
pub struct PersistenceAdapter {
    records: Arc<dyn RecordStore>,
}

enum Loaded<T> {
    /// `canonical` is false when re-serializing the value does not reproduce
    /// the stored record, e.g. because serde filled in defaults.
    Present { value: T, canonical: bool },
    Absent,
    Unreadable,
}

impl PersistenceAdapter {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Loads both records, bootstrapping whatever is missing.
    ///
    /// - An absent, unreadable or empty session record yields one fresh
    ///   session for the registry's default persona.
    /// - Sessions naming a persona the registry does not know are moved to
    ///   the default persona.
    /// - Sessions with no messages get their persona's seed message back.
    /// - An absent or unreadable settings record yields default settings.
    ///
    /// Bootstrapped, repaired or default-filled records are written back
    /// immediately so the next load sees the same state.
    pub async fn load(&self, registry: &PersonaRegistry) -> ChatState {
        let (mut sessions, mut sessions_dirty) =
            match self.load_record::<Vec<ChatSession>>(SESSIONS_RECORD).await {
                Loaded::Present { value, canonical } => (value, !canonical),
                Loaded::Absent | Loaded::Unreadable => (Vec::new(), false),
            };

        let default_persona = registry.default_persona();
        for session in sessions.iter_mut() {
            if !registry.contains(&session.persona_id) {
                tracing::warn!(
                    "[PersistenceAdapter] Session {} references unknown persona '{}', using '{}'",
                    session.id,
                    session.persona_id,
                    default_persona.id
                );
                session.persona_id = default_persona.id.clone();
                sessions_dirty = true;
            }
            let persona = registry.get(&session.persona_id).unwrap_or(default_persona);
            if session.ensure_seeded(persona) {
                tracing::warn!(
                    "[PersistenceAdapter] Session {} had no messages, restored seed",
                    session.id
                );
                sessions_dirty = true;
            }
        }

        let mut store = SessionStore::from_sessions(sessions);
        if store.is_empty() {
            let session_id = store.create_session(default_persona);
            tracing::info!(
                "[PersistenceAdapter] Bootstrapped session {} for persona {}",
                session_id,
                default_persona.id
            );
            sessions_dirty = true;
        }
        if sessions_dirty {
            self.save_sessions_logged(&store).await;
        }

        let settings = match self.load_record::<Settings>(SETTINGS_RECORD).await {
            Loaded::Present { value, canonical } => {
                if !canonical {
                    tracing::debug!("[PersistenceAdapter] Settings record completed with defaults");
                    self.save_settings_logged(&value).await;
                }
                value
            }
            Loaded::Absent | Loaded::Unreadable => {
                let settings = Settings::default();
                self.save_settings_logged(&settings).await;
                settings
            }
        };

        tracing::info!(
            "[PersistenceAdapter] Loaded {} session(s), active={:?}",
            store.len(),
            store.active_id()
        );

        ChatState { store, settings }
    }

    /// Writes the full session collection in its current order.
    pub async fn save_sessions(&self, store: &SessionStore) -> Result<()> {
        let json = serde_json::to_string(store.sessions())?;
        self.records.save(SESSIONS_RECORD, &json).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.records.save(SETTINGS_RECORD, &json).await
    }

    /// Removes the session record entirely.
    pub async fn clear_sessions(&self) -> Result<()> {
        self.records.remove(SESSIONS_RECORD).await
    }

    /// Like `save_sessions`, but a failure is only logged.
    pub async fn save_sessions_logged(&self, store: &SessionStore) {
        if let Err(e) = self.save_sessions(store).await {
            tracing::warn!("[PersistenceAdapter] Failed to persist sessions: {}", e);
        }
    }

    /// Like `save_settings`, but a failure is only logged.
    pub async fn save_settings_logged(&self, settings: &Settings) {
        if let Err(e) = self.save_settings(settings).await {
            tracing::warn!("[PersistenceAdapter] Failed to persist settings: {}", e);
        }
    }

    async fn load_record<T: DeserializeOwned + Serialize>(&self, key: &str) -> Loaded<T> {
        let raw = match self.records.load(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Loaded::Absent,
            Err(e) => {
                tracing::warn!("[PersistenceAdapter] Failed to read record '{}': {}", key, e);
                return Loaded::Unreadable;
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                let stored = serde_json::from_str::<serde_json::Value>(&raw).ok();
                let canonical = serde_json::to_value(&value).ok() == stored;
                Loaded::Present { value, canonical }
            }
            Err(e) => {
                tracing::warn!("[PersistenceAdapter] Discarding unparsable record '{}': {}", key, e);
                Loaded::Unreadable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::settings::Theme;
    use chorus_infrastructure::InMemoryRecordStore;

    #[tokio::test]
    async fn test_empty_store_bootstraps_and_writes_back() {
        let records = InMemoryRecordStore::new();
        let adapter = PersistenceAdapter::new(Arc::new(records.clone()));
        let registry = PersonaRegistry::builtin();

        let state = adapter.load(&registry).await;

        assert_eq!(state.store.len(), 1);
        let active = state.store.active_session().unwrap();
        assert_eq!(active.persona_id, registry.default_persona().id);
        assert_eq!(active.messages.len(), 1);
        assert_eq!(state.settings.theme, Theme::Dark);

        assert!(records.load(SESSIONS_RECORD).await.unwrap().is_some());
        assert!(records.load(SETTINGS_RECORD).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unparsable_records_bootstrap() {
        let records = InMemoryRecordStore::new();
        records.insert(SESSIONS_RECORD, "{not json").await;
        records.insert(SETTINGS_RECORD, "[1,2,3]").await;
        let adapter = PersistenceAdapter::new(Arc::new(records));

        let state = adapter.load(&PersonaRegistry::builtin()).await;
        assert_eq!(state.store.len(), 1);
        assert!(state.settings.anonymous_id.starts_with("ANON-"));
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_content() {
        let records = InMemoryRecordStore::new();
        let adapter = PersistenceAdapter::new(Arc::new(records));
        let registry = PersonaRegistry::builtin();

        let mut store = SessionStore::default();
        let older = store.create_session(registry.get("rebel").unwrap());
        store.append_user_message(&older, "first question");
        let newer = store.create_session(registry.get("muse").unwrap());
        adapter.save_sessions(&store).await.unwrap();

        let mut settings = Settings::default();
        settings.set_theme(Theme::Light);
        settings.set_use_live_search(false);
        adapter.save_settings(&settings).await.unwrap();

        let state = adapter.load(&registry).await;
        assert_eq!(state.store.sessions(), store.sessions());
        assert_eq!(state.store.active_id(), Some(newer.as_str()));
        assert_eq!(state.settings, settings);
    }

    #[tokio::test]
    async fn test_unknown_persona_is_remapped() {
        let records = InMemoryRecordStore::new();
        let adapter = PersistenceAdapter::new(Arc::new(records));
        let registry = PersonaRegistry::builtin();

        let mut store = SessionStore::default();
        let id = store.create_session(registry.get("rebel").unwrap());
        let mut sessions = store.into_sessions();
        sessions[0].persona_id = "retired".to_string();
        adapter
            .save_sessions(&SessionStore::from_sessions(sessions))
            .await
            .unwrap();

        let state = adapter.load(&registry).await;
        assert_eq!(state.store.get(&id).unwrap().persona_id, "sage");
    }

    #[tokio::test]
    async fn test_partial_settings_are_completed_and_stored() {
        let records = InMemoryRecordStore::new();
        records.insert(SETTINGS_RECORD, r#"{"theme":"light"}"#).await;
        let adapter = PersistenceAdapter::new(Arc::new(records.clone()));
        let registry = PersonaRegistry::builtin();

        let first = adapter.load(&registry).await.settings;
        let second = adapter.load(&registry).await.settings;

        assert_eq!(first.theme, Theme::Light);
        assert_eq!(first.anonymous_id, second.anonymous_id);
        let stored = records.load(SETTINGS_RECORD).await.unwrap().unwrap();
        let stored: Settings = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_canonical_records_are_not_rewritten() {
        let records = InMemoryRecordStore::new();
        let adapter = PersistenceAdapter::new(Arc::new(records.clone()));
        let registry = PersonaRegistry::builtin();

        adapter.load(&registry).await;
        let writes = records.write_count();
        adapter.load(&registry).await;
        assert_eq!(records.write_count(), writes);
    }

    #[tokio::test]
    async fn test_session_without_messages_is_reseeded() {
        let records = InMemoryRecordStore::new();
        let adapter = PersistenceAdapter::new(Arc::new(records.clone()));
        let registry = PersonaRegistry::builtin();

        let mut store = SessionStore::default();
        let id = store.create_session(registry.get("muse").unwrap());
        let mut sessions = store.into_sessions();
        sessions[0].messages.clear();
        adapter
            .save_sessions(&SessionStore::from_sessions(sessions))
            .await
            .unwrap();

        let state = adapter.load(&registry).await;
        let session = state.store.get(&id).unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].content, registry.get("muse").unwrap().greeting);

        let stored = records.load(SESSIONS_RECORD).await.unwrap().unwrap();
        let stored: Vec<ChatSession> = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_write_failures_do_not_break_load() {
        let records = InMemoryRecordStore::new();
        records.set_fail_writes(true);
        let adapter = PersistenceAdapter::new(Arc::new(records));

        let state = adapter.load(&PersonaRegistry::builtin()).await;
        assert_eq!(state.store.len(), 1);
        assert!(adapter.save_settings(&state.settings).await.is_err());
    }
}
