//! Persona domain module.
//!
//! This module contains the persona model, the built-in presets and the
//! read-only registry sessions resolve their persona through.
//!
//! # Module Structure
//!
//! - `model`: Core persona domain model (`Persona`)
//! - `preset`: Built-in system personas
//! - `registry`: Static catalog lookup (`PersonaRegistry`)
//!
//! # Usage
//!
//! ```ignore
//! use chorus_core::persona::{Persona, PersonaRegistry};
//! ```

mod model;
mod preset;
mod registry;

// Re-export public API
pub use model::Persona;
pub use preset::{DEFAULT_PERSONA_ID, get_default_presets};
pub use registry::PersonaRegistry;
