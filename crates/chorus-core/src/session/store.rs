//! In-memory session collection.

use super::message::{Message, MessageRole};
use super::model::{ChatSession, DEFAULT_SESSION_TITLE, title_from};
use crate::generation::GenerationResult;
use crate::persona::Persona;

/// Outcome of a persona switch on the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaSwitch {
    /// The active session had no user turns and now answers as the new persona.
    Retargeted { session_id: String },
    /// The active session already had user turns; a new session was created.
    Created { session_id: String },
}

impl PersonaSwitch {
    pub fn session_id(&self) -> &str {
        match self {
            PersonaSwitch::Retargeted { session_id } | PersonaSwitch::Created { session_id } => {
                session_id
            }
        }
    }
}

/// Owns the session collection and the active-session pointer.
///
/// Sessions are kept most-recently-updated first: creation prepends, and
/// appending a message moves the session to the front. The active pointer is
/// always `None` or the id of a session in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_session_id: Option<String>,
}

impl SessionStore {
    /// Restores a store from a persisted collection.
    ///
    /// The front session becomes active, matching what a fresh start shows.
    pub fn from_sessions(sessions: Vec<ChatSession>) -> Self {
        let active_session_id = sessions.first().map(|s| s.id.clone());
        Self {
            sessions,
            active_session_id,
        }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, session_id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.active_session_id.as_deref().and_then(|id| self.get(id))
    }

    /// Creates a seeded session for `persona`, prepends it and activates it.
    pub fn create_session(&mut self, persona: &Persona) -> String {
        let session = ChatSession::new(persona);
        let session_id = session.id.clone();

        tracing::debug!(
            "[SessionStore] Created session {} for persona {}",
            session_id,
            persona.id
        );

        self.sessions.insert(0, session);
        self.active_session_id = Some(session_id.clone());
        session_id
    }

    /// Activates `session_id`. Unknown ids leave the pointer untouched.
    pub fn switch_session(&mut self, session_id: &str) -> bool {
        if self.get(session_id).is_none() {
            tracing::debug!("[SessionStore] Ignoring switch to unknown session {}", session_id);
            return false;
        }
        self.active_session_id = Some(session_id.to_string());
        true
    }

    /// Removes a session.
    ///
    /// Deleting the active session activates the new front session, or clears
    /// the pointer when nothing is left. Deleting any other session leaves the
    /// pointer alone.
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let Some(index) = self.position(session_id) else {
            return false;
        };
        self.sessions.remove(index);

        if self.active_session_id.as_deref() == Some(session_id) {
            self.active_session_id = self.sessions.first().map(|s| s.id.clone());
        }
        true
    }

    /// Sets an explicit title. Renamed sessions are never auto-titled.
    pub fn rename_session(&mut self, session_id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        match self.session_mut(session_id) {
            Some(session) => {
                session.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Appends a user message; the first one also titles the session.
    pub fn append_user_message(&mut self, session_id: &str, text: &str) -> Option<&Message> {
        let index = self.position(session_id)?;
        let session = &mut self.sessions[index];

        if !session.has_user_message() && session.title == DEFAULT_SESSION_TITLE {
            session.title = title_from(text);
        }

        let message = Message::new(MessageRole::User, text, session.next_timestamp());
        session.push(message);
        self.touch(index)
    }

    /// Appends the dispatcher's result as a model message.
    pub fn append_model_message(
        &mut self,
        session_id: &str,
        result: &GenerationResult,
    ) -> Option<&Message> {
        let index = self.position(session_id)?;
        let session = &mut self.sessions[index];

        let message = Message::new(MessageRole::Model, result.text.clone(), session.next_timestamp())
            .with_image_url(result.image_url.clone())
            .with_citations(result.citations.clone());
        session.push(message);
        self.touch(index)
    }

    /// Points a session that has no user turns yet at another persona.
    ///
    /// Returns `false` if the session is unknown or already has user turns.
    pub fn set_persona_for_empty_session(&mut self, session_id: &str, persona_id: &str) -> bool {
        match self.session_mut(session_id) {
            Some(session) if session.is_pristine() => {
                session.persona_id = persona_id.to_string();
                true
            }
            _ => false,
        }
    }

    /// Applies the persona-switch policy to the active session.
    ///
    /// A session holding only its seed message is retargeted in place; a
    /// session with user turns is left untouched and a new session is created
    /// for `persona`. Without an active session a new one is created.
    pub fn switch_persona(&mut self, persona: &Persona) -> PersonaSwitch {
        if let Some(active_id) = self.active_session_id.clone()
            && self.set_persona_for_empty_session(&active_id, &persona.id)
        {
            tracing::debug!(
                "[SessionStore] Retargeted session {} to persona {}",
                active_id,
                persona.id
            );
            return PersonaSwitch::Retargeted {
                session_id: active_id,
            };
        }

        PersonaSwitch::Created {
            session_id: self.create_session(persona),
        }
    }

    /// Drops every session and clears the active pointer.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.active_session_id = None;
    }

    /// Consumes the store, returning the ordered collection.
    pub fn into_sessions(self) -> Vec<ChatSession> {
        self.sessions
    }

    fn position(&self, session_id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == session_id)
    }

    fn session_mut(&mut self, session_id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == session_id)
    }

    /// Moves the session at `index` to the front and returns its last message.
    fn touch(&mut self, index: usize) -> Option<&Message> {
        let session = self.sessions.remove(index);
        self.sessions.insert(0, session);
        self.sessions[0].messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaRegistry;
    use crate::session::Citation;

    fn assert_active_valid(store: &SessionStore) {
        if let Some(id) = store.active_id() {
            assert!(store.get(id).is_some(), "active id {} not in collection", id);
        }
    }

    #[test]
    fn test_create_session_prepends_and_activates() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();

        let first = store.create_session(registry.get("sage").unwrap());
        let second = store.create_session(registry.get("rebel").unwrap());

        assert_eq!(store.sessions()[0].id, second);
        assert_eq!(store.sessions()[1].id, first);
        assert_eq!(store.active_id(), Some(second.as_str()));

        let session = store.get(&second).unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, MessageRole::Model);
        assert_eq!(session.persona_id, "rebel");
    }

    #[test]
    fn test_switch_session_ignores_unknown_id() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let a = store.create_session(registry.default_persona());
        let b = store.create_session(registry.default_persona());

        assert!(store.switch_session(&a));
        assert_eq!(store.active_id(), Some(a.as_str()));
        assert!(!store.switch_session("missing"));
        assert_eq!(store.active_id(), Some(a.as_str()));
        assert!(store.switch_session(&b));
        assert_eq!(store.active_id(), Some(b.as_str()));
    }

    #[test]
    fn test_delete_active_reassigns_to_front() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let a = store.create_session(registry.default_persona());
        let b = store.create_session(registry.default_persona());
        let c = store.create_session(registry.default_persona());

        // Order is [c, b, a]; make b active and delete it.
        store.switch_session(&b);
        assert!(store.delete_session(&b));
        assert_eq!(store.active_id(), Some(c.as_str()));

        assert!(store.delete_session(&c));
        assert_eq!(store.active_id(), Some(a.as_str()));

        assert!(store.delete_session(&a));
        assert_eq!(store.active_id(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_non_active_keeps_pointer() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let a = store.create_session(registry.default_persona());
        let b = store.create_session(registry.default_persona());

        assert!(store.delete_session(&a));
        assert_eq!(store.active_id(), Some(b.as_str()));
        assert!(!store.delete_session("missing"));
        assert_eq!(store.active_id(), Some(b.as_str()));
    }

    #[test]
    fn test_active_pointer_invariant_over_mixed_operations() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let mut ids = Vec::new();

        for step in 0..60usize {
            match step % 5 {
                0 | 3 => ids.push(store.create_session(registry.default_persona())),
                1 => {
                    if let Some(id) = ids.get(step % ids.len().max(1)) {
                        store.switch_session(id);
                    }
                }
                2 => {
                    if !ids.is_empty() {
                        let id = ids.remove((step * 7) % ids.len());
                        store.delete_session(&id);
                    }
                }
                _ => {
                    store.switch_session("not-a-session");
                    if let Some(id) = store.active_id().map(str::to_string) {
                        store.delete_session(&id);
                        ids.retain(|i| *i != id);
                    }
                }
            }
            assert_active_valid(&store);
        }
    }

    #[test]
    fn test_title_set_once_from_first_user_message() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let id = store.create_session(registry.default_persona());
        assert_eq!(store.get(&id).unwrap().title, DEFAULT_SESSION_TITLE);

        store.append_user_message(&id, "Hello there, how are you today friend");
        assert_eq!(store.get(&id).unwrap().title, "Hello there, how are you");

        store.append_user_message(&id, "Something else entirely");
        assert_eq!(store.get(&id).unwrap().title, "Hello there, how are you");
    }

    #[test]
    fn test_renamed_session_is_not_auto_titled() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let id = store.create_session(registry.default_persona());

        assert!(store.rename_session(&id, "  Trip plans "));
        store.append_user_message(&id, "Where should we go?");
        assert_eq!(store.get(&id).unwrap().title, "Trip plans");
        assert!(!store.rename_session(&id, "   "));
        assert!(!store.rename_session("missing", "x"));
    }

    #[test]
    fn test_append_moves_session_to_front() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let a = store.create_session(registry.default_persona());
        let b = store.create_session(registry.default_persona());
        assert_eq!(store.sessions()[0].id, b);

        store.append_user_message(&a, "bump");
        assert_eq!(store.sessions()[0].id, a);
        // Appending does not change which session is active.
        assert_eq!(store.active_id(), Some(b.as_str()));
    }

    #[test]
    fn test_append_to_unknown_session_is_noop() {
        let mut store = SessionStore::default();
        assert!(store.append_user_message("missing", "hi").is_none());
        assert!(
            store
                .append_model_message("missing", &GenerationResult::text("hi"))
                .is_none()
        );
    }

    #[test]
    fn test_model_message_carries_image_and_citations() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let id = store.create_session(registry.default_persona());
        let result = GenerationResult {
            text: "done".into(),
            image_url: Some("data:image/png;base64,AAAA".into()),
            citations: Some(vec![Citation {
                title: "Source".into(),
                uri: "https://example.com".into(),
            }]),
        };

        let message = store.append_model_message(&id, &result).unwrap().clone();
        assert_eq!(message.role, MessageRole::Model);
        assert_eq!(message.content, "done");
        assert_eq!(message.image_url, result.image_url);
        assert_eq!(message.citations, result.citations);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let id = store.create_session(registry.default_persona());
        for i in 0..20 {
            store.append_user_message(&id, &format!("m{}", i));
            store.append_model_message(&id, &GenerationResult::text("r"));
        }
        let session = store.get(&id).unwrap();
        for pair in session.messages.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(session.last_updated, session.messages.last().unwrap().timestamp);
    }

    #[test]
    fn test_persona_switch_on_pristine_session_retargets() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let id = store.create_session(registry.get("sage").unwrap());

        let outcome = store.switch_persona(registry.get("muse").unwrap());

        assert_eq!(outcome, PersonaSwitch::Retargeted { session_id: id.clone() });
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().persona_id, "muse");
    }

    #[test]
    fn test_persona_switch_with_user_turns_creates_session() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let id = store.create_session(registry.get("sage").unwrap());
        store.append_user_message(&id, "hi");

        let outcome = store.switch_persona(registry.get("rebel").unwrap());

        let PersonaSwitch::Created { session_id } = outcome else {
            panic!("expected a new session");
        };
        assert_ne!(session_id, id);
        assert_eq!(store.active_id(), Some(session_id.as_str()));
        assert_eq!(store.get(&session_id).unwrap().persona_id, "rebel");
        assert_eq!(store.get(&id).unwrap().persona_id, "sage");
    }

    #[test]
    fn test_persona_switch_without_active_session_creates_one() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let outcome = store.switch_persona(registry.get("muse").unwrap());
        assert!(matches!(outcome, PersonaSwitch::Created { .. }));
        assert_eq!(store.active_session().unwrap().persona_id, "muse");
    }

    #[test]
    fn test_from_sessions_activates_front() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        let a = store.create_session(registry.default_persona());
        let b = store.create_session(registry.default_persona());
        store.switch_session(&a);

        let restored = SessionStore::from_sessions(store.clone().into_sessions());
        assert_eq!(restored.active_id(), Some(b.as_str()));
        assert_eq!(restored.sessions(), store.sessions());

        let empty = SessionStore::from_sessions(Vec::new());
        assert_eq!(empty.active_id(), None);
    }

    #[test]
    fn test_clear() {
        let registry = PersonaRegistry::builtin();
        let mut store = SessionStore::default();
        store.create_session(registry.default_persona());
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.active_id(), None);
    }
}
