//! Generation dispatcher.
//!
//! Decides between the image and text paths for one turn, calls the provider
//! and folds every outcome, including failures, into a `GenerationResult`.

use super::classify::{FailureKind, classify};
use super::provider::{
    AspectRatio, ContextTurn, FailureSignal, GenerationProvider, ImageRequest, ImageResponse,
    TextRequest,
};
use super::trigger::TriggerVocabulary;
use crate::persona::Persona;
use crate::session::{Citation, Message};
use crate::settings::GenerationFlags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of most recent messages forwarded to text generation.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Sampling temperature used for every persona.
pub const DEFAULT_TEMPERATURE: f32 = 0.9;

/// Reply text accompanying a generated image.
pub const IMAGE_CONFIRMATION_TEXT: &str = "Here is your image.";

/// Reply text when the provider answered without any text.
pub const EMPTY_RESPONSE_TEXT: &str = "I couldn't make sense of that. Please try again.";

/// Reply text when image generation returned no image and fallback is off.
pub const NO_IMAGE_TEXT: &str = "The image could not be generated. Try rephrasing the request.";

/// What happens when the image path produces no image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFallback {
    /// Continue with the text path in the same turn.
    #[default]
    TextPath,
    /// End the turn with an explanatory message.
    Disabled,
}

/// Path chosen for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Image,
    Text,
}

/// Tunables of the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub context_window: usize,
    pub temperature: f32,
    pub image_fallback: ImageFallback,
    pub aspect_ratio: AspectRatio,
    pub triggers: TriggerVocabulary,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            temperature: DEFAULT_TEMPERATURE,
            image_fallback: ImageFallback::default(),
            aspect_ratio: AspectRatio::Square,
            triggers: TriggerVocabulary::default(),
        }
    }
}

/// Normalized outcome of one turn, ready to be appended as a model message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
    pub image_url: Option<String>,
    pub citations: Option<Vec<Citation>>,
}

impl GenerationResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_url: None,
            citations: None,
        }
    }

    pub fn failure(kind: FailureKind) -> Self {
        Self::text(kind.user_message())
    }
}

enum ImageAttempt {
    Generated(GenerationResult),
    NoPayload,
    Failed(FailureSignal),
}

/// Routes a turn to the provider and absorbs every failure.
pub struct GenerationDispatcher {
    provider: Arc<dyn GenerationProvider>,
    config: DispatchConfig,
}

impl GenerationDispatcher {
    pub fn new(provider: Arc<dyn GenerationProvider>, config: DispatchConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Image mode iff image generation is enabled and a trigger word occurs.
    pub fn select_mode(&self, user_input: &str, flags: &GenerationFlags) -> GenerationMode {
        if flags.use_image_gen && self.config.triggers.matches(user_input) {
            GenerationMode::Image
        } else {
            GenerationMode::Text
        }
    }

    /// The last `context_window` messages of `history`.
    pub fn context_window<'a>(&self, history: &'a [Message]) -> &'a [Message] {
        let start = history.len().saturating_sub(self.config.context_window);
        &history[start..]
    }

    /// Produces the reply for one turn.
    ///
    /// `history` is the session as it stands after the user's message was
    /// appended, so the submission itself is the last context turn.
    pub async fn dispatch(
        &self,
        persona: &Persona,
        history: &[Message],
        user_input: &str,
        flags: &GenerationFlags,
    ) -> GenerationResult {
        if self.select_mode(user_input, flags) == GenerationMode::Image {
            match self.try_image(user_input).await {
                ImageAttempt::Generated(result) => return result,
                ImageAttempt::NoPayload => {
                    tracing::debug!("[Dispatcher] Image response carried no inline data");
                    if self.config.image_fallback == ImageFallback::Disabled {
                        return GenerationResult::text(NO_IMAGE_TEXT);
                    }
                }
                ImageAttempt::Failed(signal) => {
                    let kind = classify(&signal);
                    tracing::warn!("[Dispatcher] Image generation failed ({}): {}", kind, signal);
                    if self.config.image_fallback == ImageFallback::Disabled {
                        return GenerationResult::failure(kind);
                    }
                }
            }
            tracing::debug!("[Dispatcher] Falling back to text generation");
        }

        self.generate_text(persona, history, flags).await
    }

    async fn try_image(&self, user_input: &str) -> ImageAttempt {
        let request = ImageRequest {
            prompt: user_input.to_string(),
            aspect_ratio: self.config.aspect_ratio,
        };

        match self.provider.generate_image(request).await {
            Ok(response) => match first_image_url(&response) {
                Some(image_url) => ImageAttempt::Generated(GenerationResult {
                    text: IMAGE_CONFIRMATION_TEXT.to_string(),
                    image_url: Some(image_url),
                    citations: None,
                }),
                None => ImageAttempt::NoPayload,
            },
            Err(signal) => ImageAttempt::Failed(signal),
        }
    }

    async fn generate_text(
        &self,
        persona: &Persona,
        history: &[Message],
        flags: &GenerationFlags,
    ) -> GenerationResult {
        let contents: Vec<ContextTurn> = self
            .context_window(history)
            .iter()
            .map(|message| ContextTurn {
                role: message.role,
                text: message.content.clone(),
            })
            .collect();

        tracing::debug!(
            "[Dispatcher] Text generation: persona={}, turns={}, grounding={}",
            persona.id,
            contents.len(),
            flags.use_live_search
        );

        let request = TextRequest {
            system_instruction: persona.style_instruction.clone(),
            contents,
            grounding_enabled: flags.use_live_search,
            temperature: self.config.temperature,
        };

        match self.provider.generate_text(request).await {
            Ok(response) => GenerationResult {
                text: response
                    .text
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| EMPTY_RESPONSE_TEXT.to_string()),
                image_url: None,
                citations: Some(response.citations).filter(|c| !c.is_empty()),
            },
            Err(signal) => {
                let kind = classify(&signal);
                tracing::warn!("[Dispatcher] Text generation failed ({}): {}", kind, signal);
                GenerationResult::failure(kind)
            }
        }
    }
}

/// Data URI of the first part carrying inline image data, wherever it sits.
fn first_image_url(response: &ImageResponse) -> Option<String> {
    response
        .parts
        .iter()
        .filter_map(|part| part.inline_image.as_ref())
        .find(|image| !image.data.is_empty())
        .map(|image| {
            let mime_type = image.mime_type.as_deref().unwrap_or("image/png");
            format!("data:{};base64,{}", mime_type, image.data)
        })
}
