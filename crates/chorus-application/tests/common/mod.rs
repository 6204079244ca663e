//! Shared fixtures for the application integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_application::ChatUseCase;
use chorus_core::credential::CredentialSource;
use chorus_core::error::Result;
use chorus_core::generation::{
    DispatchConfig, FailureSignal, GenerationProvider, ImagePart, ImageRequest, ImageResponse,
    InlineImage, TextRequest, TextResponse,
};
use chorus_core::persona::PersonaRegistry;
use chorus_core::record::RecordStore;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Provider with scripted replies that records every request.
///
/// When `hold` is set, text generation waits for `release` before answering.
#[derive(Default)]
pub struct ScriptedProvider {
    pub text_reply: Mutex<Option<std::result::Result<TextResponse, FailureSignal>>>,
    pub image_reply: Mutex<Option<std::result::Result<ImageResponse, FailureSignal>>>,
    pub text_requests: Mutex<Vec<TextRequest>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
    pub hold: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        let provider = Self::default();
        *provider.text_reply.lock().unwrap() = Some(Ok(TextResponse {
            text: Some(text.to_string()),
            citations: Vec::new(),
        }));
        Arc::new(provider)
    }

    pub fn failing(signal: FailureSignal) -> Arc<Self> {
        let provider = Self::default();
        *provider.text_reply.lock().unwrap() = Some(Err(signal));
        Arc::new(provider)
    }

    pub fn with_png(self: Arc<Self>, data: &str) -> Arc<Self> {
        *self.image_reply.lock().unwrap() = Some(Ok(ImageResponse {
            parts: vec![ImagePart {
                text: None,
                inline_image: Some(InlineImage {
                    mime_type: Some("image/png".into()),
                    data: data.into(),
                }),
            }],
        }));
        self
    }

    pub fn text_request_count(&self) -> usize {
        self.text_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn generate_text(
        &self,
        request: TextRequest,
    ) -> std::result::Result<TextResponse, FailureSignal> {
        self.text_requests.lock().unwrap().push(request);
        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.text_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(TextResponse::default()))
    }

    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> std::result::Result<ImageResponse, FailureSignal> {
        self.image_requests.lock().unwrap().push(request);
        self.image_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(ImageResponse::default()))
    }
}

/// Credential source whose answer can be flipped by the test.
pub struct StubCredentials {
    pub present: AtomicBool,
    pub selections: Mutex<usize>,
}

impl StubCredentials {
    pub fn new(present: bool) -> Arc<Self> {
        Arc::new(Self {
            present: AtomicBool::new(present),
            selections: Mutex::new(0),
        })
    }
}

#[async_trait]
impl CredentialSource for StubCredentials {
    async fn has_credential(&self) -> Result<bool> {
        Ok(self.present.load(Ordering::SeqCst))
    }

    async fn request_credential_selection(&self) -> Result<()> {
        *self.selections.lock().unwrap() += 1;
        self.present.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub async fn use_case(
    provider: Arc<ScriptedProvider>,
    records: Arc<dyn RecordStore>,
) -> ChatUseCase {
    ChatUseCase::load(
        PersonaRegistry::builtin(),
        provider,
        DispatchConfig::default(),
        records,
        None,
    )
    .await
}
