//! Static persona catalog.

use super::model::Persona;
use super::preset::{DEFAULT_PERSONA_ID, get_default_presets};
use crate::error::{ChorusError, Result};

/// Read-only catalog of personas, built once at process start.
///
/// Lookups by id fail with `ChorusError::NotFound`; an unknown id means a
/// caller or a persisted record referenced a persona this build never
/// shipped, which is not a user-facing condition.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
    default_id: String,
}

impl PersonaRegistry {
    /// Creates a registry from an explicit catalog.
    ///
    /// # Errors
    ///
    /// Returns a config error if the catalog is empty, contains duplicate ids,
    /// or does not contain `default_id`.
    pub fn new(personas: Vec<Persona>, default_id: impl Into<String>) -> Result<Self> {
        let default_id = default_id.into();

        if personas.is_empty() {
            return Err(ChorusError::config("persona catalog is empty"));
        }
        for (index, persona) in personas.iter().enumerate() {
            if personas[..index].iter().any(|p| p.id == persona.id) {
                return Err(ChorusError::config(format!(
                    "duplicate persona id '{}'",
                    persona.id
                )));
            }
        }
        if !personas.iter().any(|p| p.id == default_id) {
            return Err(ChorusError::config(format!(
                "default persona '{}' is not in the catalog",
                default_id
            )));
        }

        Ok(Self {
            personas,
            default_id,
        })
    }

    /// The built-in presets with `sage` as default.
    pub fn builtin() -> Self {
        Self {
            personas: get_default_presets(),
            default_id: DEFAULT_PERSONA_ID.to_string(),
        }
    }

    /// The built-in presets with a different default persona.
    pub fn builtin_with_default(default_id: &str) -> Result<Self> {
        Self::new(get_default_presets(), default_id)
    }

    /// Looks a persona up by id.
    pub fn get(&self, id: &str) -> Result<&Persona> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ChorusError::not_found("Persona", id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.personas.iter().any(|p| p.id == id)
    }

    pub fn default_persona(&self) -> &Persona {
        // `new` and `builtin` both guarantee the default id is present.
        self.personas
            .iter()
            .find(|p| p.id == self.default_id)
            .unwrap_or(&self.personas[0])
    }

    pub fn all(&self) -> &[Persona] {
        &self.personas
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
