//! Generation domain module.
//!
//! Everything between a user submission and the text that gets appended back
//! into the session: mode selection, the provider capability contract,
//! failure classification and the dispatcher that ties them together.
//!
//! # Module Structure
//!
//! - `provider`: Capability contract implemented by provider clients
//! - `classify`: Failure taxonomy and user-facing messages
//! - `trigger`: Image-mode trigger vocabulary
//! - `dispatcher`: `GenerationDispatcher` and its configuration

mod classify;
mod dispatcher;
mod provider;
mod trigger;

pub use classify::{FailureKind, classify};
pub use dispatcher::{
    DEFAULT_CONTEXT_WINDOW, DEFAULT_TEMPERATURE, DispatchConfig, EMPTY_RESPONSE_TEXT,
    GenerationDispatcher, GenerationMode, GenerationResult, IMAGE_CONFIRMATION_TEXT,
    ImageFallback, NO_IMAGE_TEXT,
};
pub use provider::{
    AspectRatio, ContextTurn, FailureSignal, GenerationProvider, ImagePart, ImageRequest,
    ImageResponse, InlineImage, TextRequest, TextResponse,
};
pub use trigger::{DEFAULT_TRIGGER_WORDS, TriggerVocabulary};
