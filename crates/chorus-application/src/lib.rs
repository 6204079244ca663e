//! Application layer for Chorus.
//!
//! Coordinates the domain types with a record store and a generation
//! provider: loading and bootstrapping state, the submit flow, session
//! management and write-through persistence.

pub mod chat_usecase;
pub mod persistence;
pub mod state;

pub use chat_usecase::{ChatUseCase, SubmitOutcome};
pub use persistence::PersistenceAdapter;
pub use state::ChatState;
