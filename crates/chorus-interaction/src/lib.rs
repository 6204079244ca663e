//! Provider clients implementing `chorus_core::generation::GenerationProvider`.

pub mod gemini_api_provider;

pub use gemini_api_provider::GeminiApiProvider;
