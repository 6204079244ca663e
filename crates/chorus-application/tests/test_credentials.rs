mod common;

use chorus_application::{ChatUseCase, SubmitOutcome};
use chorus_core::credential::{CredentialSource, CredentialState};
use chorus_core::generation::DispatchConfig;
use chorus_core::persona::PersonaRegistry;
use chorus_core::settings::Theme;
use chorus_infrastructure::InMemoryRecordStore;
use common::{ScriptedProvider, StubCredentials};
use std::sync::Arc;

async fn gated_use_case(
    provider: Arc<ScriptedProvider>,
    credentials: Arc<StubCredentials>,
) -> ChatUseCase {
    ChatUseCase::load(
        PersonaRegistry::builtin(),
        provider,
        DispatchConfig::default(),
        Arc::new(InMemoryRecordStore::new()),
        Some(credentials as Arc<dyn CredentialSource>),
    )
    .await
}

#[tokio::test]
async fn test_missing_credential_blocks_operations() {
    let provider = ScriptedProvider::replying("unused");
    let chat = gated_use_case(provider.clone(), StubCredentials::new(false)).await;

    assert_eq!(chat.credential_state().await, CredentialState::Unauthorized);
    assert!(chat.submit("hello").await.unwrap_err().is_security());
    assert!(chat.create_session(None).await.unwrap_err().is_security());
    assert!(chat.switch_persona("muse").await.unwrap_err().is_security());
    assert!(chat.wipe().await.unwrap_err().is_security());
    assert_eq!(provider.text_request_count(), 0);

    // Nothing was appended to the bootstrap session.
    assert_eq!(chat.active_session().await.unwrap().messages.len(), 1);
}

#[tokio::test]
async fn test_acquire_credential_opens_gate() {
    let credentials = StubCredentials::new(false);
    let chat = gated_use_case(ScriptedProvider::replying("welcome"), credentials.clone()).await;

    assert_eq!(chat.acquire_credential().await.unwrap(), CredentialState::Authorized);
    assert_eq!(*credentials.selections.lock().unwrap(), 1);

    assert!(matches!(
        chat.submit("hello").await.unwrap(),
        SubmitOutcome::Replied { .. }
    ));
}

#[tokio::test]
async fn test_present_credential_is_authorized() {
    let chat = gated_use_case(ScriptedProvider::replying("hi"), StubCredentials::new(true)).await;
    assert_eq!(chat.credential_state().await, CredentialState::Authorized);
    assert!(chat.submit("hello").await.is_ok());
}

#[tokio::test]
async fn test_settings_remain_editable_while_unauthorized() {
    let chat = gated_use_case(ScriptedProvider::replying("hi"), StubCredentials::new(false)).await;
    let settings = chat.set_theme(Theme::Auto).await;
    assert_eq!(settings.theme, Theme::Auto);
}

#[tokio::test]
async fn test_replace_provider_takes_effect() {
    let first = ScriptedProvider::replying("old key");
    let second = ScriptedProvider::replying("new key");
    let chat = gated_use_case(first.clone(), StubCredentials::new(true)).await;

    chat.replace_provider(second.clone()).await;
    let SubmitOutcome::Replied { reply, .. } = chat.submit("hello").await.unwrap() else {
        panic!("expected a reply");
    };
    assert_eq!(reply.content, "new key");
    assert_eq!(first.text_request_count(), 0);
    assert_eq!(second.text_request_count(), 1);
}
