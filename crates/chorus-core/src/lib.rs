//! Domain layer of the Chorus chat client.
//!
//! Personas, sessions and settings, the generation dispatcher with its
//! provider contract, the credential gate, and the storage/secret traits the
//! outer crates implement.

pub mod config;
pub mod credential;
pub mod error;
pub mod generation;
pub mod persona;
pub mod record;
pub mod secret;
pub mod session;
pub mod settings;

// Re-export common error type
pub use error::{ChorusError, Result};
