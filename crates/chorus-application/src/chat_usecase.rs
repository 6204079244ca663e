//! Chat use case implementation.
//!
//! `ChatUseCase` owns the session store and settings, routes submissions
//! through the generation dispatcher and writes every mutation through the
//! persistence adapter.
//!
//! # Thread Safety
//!
//! State lives behind a `tokio::sync::Mutex` that is never held across a
//! provider call. At most one generation runs at a time; the busy flag is
//! claimed before dispatch and released by a guard on every exit path.

use crate::persistence::PersistenceAdapter;
use crate::state::ChatState;
use chorus_core::credential::{CredentialGate, CredentialSource, CredentialState};
use chorus_core::error::Result;
use chorus_core::generation::{DispatchConfig, GenerationDispatcher, GenerationProvider};
use chorus_core::persona::{Persona, PersonaRegistry};
use chorus_core::record::RecordStore;
use chorus_core::session::{ChatSession, Message, PersonaSwitch};
use chorus_core::settings::{Settings, Theme};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The reply was appended to `session_id`.
    Replied { session_id: String, reply: Message },
    /// Another generation is still running; nothing changed.
    Busy,
    /// Blank input or no active session; nothing changed.
    Ignored,
    /// The session was deleted while its reply was being generated.
    Discarded { session_id: String },
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatUseCase {
    state: Mutex<ChatState>,
    registry: PersonaRegistry,
    dispatcher: RwLock<Arc<GenerationDispatcher>>,
    gate: Mutex<CredentialGate>,
    credentials: Option<Arc<dyn CredentialSource>>,
    persistence: PersistenceAdapter,
    busy: AtomicBool,
}

impl ChatUseCase {
    /// Loads persisted state and resolves the credential gate.
    ///
    /// Without a credential source the gate starts open.
    pub async fn load(
        registry: PersonaRegistry,
        provider: Arc<dyn GenerationProvider>,
        dispatch_config: DispatchConfig,
        records: Arc<dyn RecordStore>,
        credentials: Option<Arc<dyn CredentialSource>>,
    ) -> Self {
        let persistence = PersistenceAdapter::new(records);
        let state = persistence.load(&registry).await;

        let gate = match credentials.as_deref() {
            Some(source) => {
                let mut gate = CredentialGate::new();
                gate.check(source).await;
                gate
            }
            None => CredentialGate::authorized(),
        };

        Self {
            state: Mutex::new(state),
            registry,
            dispatcher: RwLock::new(Arc::new(GenerationDispatcher::new(provider, dispatch_config))),
            gate: Mutex::new(gate),
            credentials,
            persistence,
            busy: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> ChatState {
        self.state.lock().await.clone()
    }

    pub async fn active_session(&self) -> Option<ChatSession> {
        self.state.lock().await.active_session().cloned()
    }

    pub async fn settings(&self) -> Settings {
        self.state.lock().await.settings.clone()
    }

    /// Persona of the active session, if any.
    pub async fn active_persona(&self) -> Result<Option<Persona>> {
        let state = self.state.lock().await;
        match state.active_session() {
            Some(session) => Ok(Some(self.registry.get(&session.persona_id)?.clone())),
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    pub async fn credential_state(&self) -> CredentialState {
        self.gate.lock().await.state()
    }

    /// Runs the external credential selection flow and opens the gate.
    pub async fn acquire_credential(&self) -> Result<CredentialState> {
        let mut gate = self.gate.lock().await;
        match self.credentials.as_deref() {
            Some(source) => gate.acquire(source).await,
            None => Ok(gate.state()),
        }
    }

    /// Swaps the provider, e.g. after a new API key was entered.
    pub async fn replace_provider(&self, provider: Arc<dyn GenerationProvider>) {
        let mut dispatcher = self.dispatcher.write().await;
        let config = dispatcher.config().clone();
        *dispatcher = Arc::new(GenerationDispatcher::new(provider, config));
        tracing::info!("[ChatUseCase] Generation provider replaced");
    }

    async fn ensure_authorized(&self) -> Result<()> {
        self.gate.lock().await.ensure_authorized()
    }

    // ------------------------------------------------------------------
    // Conversation
    // ------------------------------------------------------------------

    /// Submits user input to the active session and appends the reply.
    ///
    /// Generation failures come back as an ordinary reply; only gate
    /// rejections and unknown personas are errors.
    pub async fn submit(&self, input: &str) -> Result<SubmitOutcome> {
        self.ensure_authorized().await?;

        let text = input.trim();
        if text.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        let Some(_busy) = BusyGuard::try_claim(&self.busy) else {
            tracing::debug!("[ChatUseCase] Submission rejected while busy");
            return Ok(SubmitOutcome::Busy);
        };

        let (session_id, persona, history, flags) = {
            let mut state = self.state.lock().await;
            let Some(session) = state.store.active_session() else {
                return Ok(SubmitOutcome::Ignored);
            };
            let session_id = session.id.clone();
            let persona = self.registry.get(&session.persona_id)?.clone();

            state.store.append_user_message(&session_id, text);
            self.persistence.save_sessions_logged(&state.store).await;

            let history = state
                .store
                .get(&session_id)
                .map(|s| s.messages.clone())
                .unwrap_or_default();
            (session_id, persona, history, state.settings.generation_flags)
        };

        let dispatcher = self.dispatcher.read().await.clone();
        let result = dispatcher.dispatch(&persona, &history, text, &flags).await;

        let mut state = self.state.lock().await;
        let Some(reply) = state.store.append_model_message(&session_id, &result).cloned() else {
            tracing::warn!(
                "[ChatUseCase] Session {} was deleted before its reply arrived; dropping it",
                session_id
            );
            return Ok(SubmitOutcome::Discarded { session_id });
        };
        self.persistence.save_sessions_logged(&state.store).await;

        Ok(SubmitOutcome::Replied { session_id, reply })
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Creates a session for `persona_id`, or the default persona.
    pub async fn create_session(&self, persona_id: Option<&str>) -> Result<String> {
        self.ensure_authorized().await?;
        let persona = match persona_id {
            Some(id) => self.registry.get(id)?,
            None => self.registry.default_persona(),
        };

        let mut state = self.state.lock().await;
        let session_id = state.store.create_session(persona);
        self.persistence.save_sessions_logged(&state.store).await;
        Ok(session_id)
    }

    pub async fn switch_session(&self, session_id: &str) -> Result<bool> {
        self.ensure_authorized().await?;
        Ok(self.state.lock().await.store.switch_session(session_id))
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool> {
        self.ensure_authorized().await?;
        let mut state = self.state.lock().await;
        let deleted = state.store.delete_session(session_id);
        if deleted {
            tracing::debug!("[ChatUseCase] Deleted session {}", session_id);
            self.persistence.save_sessions_logged(&state.store).await;
        }
        Ok(deleted)
    }

    pub async fn rename_session(&self, session_id: &str, title: &str) -> Result<bool> {
        self.ensure_authorized().await?;
        let mut state = self.state.lock().await;
        let renamed = state.store.rename_session(session_id, title);
        if renamed {
            self.persistence.save_sessions_logged(&state.store).await;
        }
        Ok(renamed)
    }

    /// Applies the persona-switch policy to the active session.
    pub async fn switch_persona(&self, persona_id: &str) -> Result<PersonaSwitch> {
        self.ensure_authorized().await?;
        let persona = self.registry.get(persona_id)?;

        let mut state = self.state.lock().await;
        let outcome = state.store.switch_persona(persona);
        self.persistence.save_sessions_logged(&state.store).await;
        Ok(outcome)
    }

    /// Deletes every session and starts over with one default session.
    ///
    /// Settings are kept.
    pub async fn wipe(&self) -> Result<String> {
        self.ensure_authorized().await?;
        let mut state = self.state.lock().await;
        state.store.clear();
        if let Err(e) = self.persistence.clear_sessions().await {
            tracing::warn!("[ChatUseCase] Failed to remove session record: {}", e);
        }

        let session_id = state.store.create_session(self.registry.default_persona());
        self.persistence.save_sessions_logged(&state.store).await;
        tracing::info!("[ChatUseCase] Wiped all sessions");
        Ok(session_id)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub async fn set_use_image_gen(&self, enabled: bool) -> Settings {
        self.update_settings(|s| s.set_use_image_gen(enabled)).await
    }

    pub async fn set_use_live_search(&self, enabled: bool) -> Settings {
        self.update_settings(|s| s.set_use_live_search(enabled)).await
    }

    pub async fn set_theme(&self, theme: Theme) -> Settings {
        self.update_settings(|s| s.set_theme(theme)).await
    }

    async fn update_settings<F>(&self, update: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let mut state = self.state.lock().await;
        update(&mut state.settings);
        self.persistence.save_settings_logged(&state.settings).await;
        state.settings.clone()
    }
}
