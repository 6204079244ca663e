//! Session domain module.
//!
//! This module contains the session models and the in-memory store that owns
//! the session collection and the active-session pointer.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`MessageRole`, `Message`, `Citation`)
//! - `model`: Core session model (`ChatSession`)
//! - `store`: Session collection and lifecycle operations (`SessionStore`)
//!
//! # Usage
//!
//! ```ignore
//! use chorus_core::session::{ChatSession, Message, MessageRole, SessionStore};
//! ```

mod message;
mod model;
mod store;

// Re-export public API
pub use message::{Citation, Message, MessageRole};
pub use model::{ChatSession, DEFAULT_SESSION_TITLE, TITLE_MAX_CHARS};
pub use store::{PersonaSwitch, SessionStore};
