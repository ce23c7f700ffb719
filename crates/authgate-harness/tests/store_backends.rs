//! Restart scenarios against the real credential stores.
//!
//! Each run builds a fresh provider and runtime over the same store, the way
//! the terminal binary does on every launch.

use std::sync::Arc;

use authgate_app::{AuthProvider, ProviderConfig, Runtime, UserInput};
use authgate_core::{CredentialStore, Route, Token};
use authgate_harness::{InvariantRegistry, SimDriver};
use authgate_store::{MemoryCredentialStore, RedbCredentialStore};
use tempfile::tempdir;

async fn launch<S: CredentialStore>(
    store: S,
    inputs: impl IntoIterator<Item = UserInput>,
) -> Vec<Route> {
    let driver = SimDriver::scripted(inputs).with_invariants(InvariantRegistry::standard());
    let provider = Arc::new(AuthProvider::new(store, ProviderConfig::default()));
    Runtime::new(driver.clone(), provider).run().await.expect("runtime");
    driver.redirects()
}

fn login(raw: &str) -> UserInput {
    UserInput::Login { credential: Some(raw.to_string()) }
}

#[tokio::test]
async fn memory_store_session_survives_relaunch() {
    let store = MemoryCredentialStore::new();

    let first = launch(store.clone(), [login("tok")]).await;
    assert_eq!(first, vec![Route::Login, Route::Home]);
    assert_eq!(store.stored().as_ref().map(Token::expose), Some("tok"));

    let second = launch(store.clone(), [UserInput::Logout]).await;
    assert_eq!(second, vec![Route::Home, Route::Login]);
    assert!(store.stored().is_none());

    let third = launch(store, []).await;
    assert_eq!(third, vec![Route::Login]);
}

#[tokio::test]
async fn redb_store_session_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("session.redb");

    let store = RedbCredentialStore::open(&path).expect("open");
    assert_eq!(launch(store, [login("tok")]).await, vec![Route::Login, Route::Home]);

    let store = RedbCredentialStore::open(&path).expect("reopen");
    assert_eq!(
        launch(store, [UserInput::Navigate(Route::Profile), UserInput::Logout]).await,
        vec![Route::Home, Route::Login]
    );

    let store = RedbCredentialStore::open(&path).expect("reopen");
    assert_eq!(launch(store.clone(), []).await, vec![Route::Login]);
    assert_eq!(store.read().await, Ok(None));
}

#[tokio::test]
async fn force_logout_keeps_credential_for_next_launch() {
    let store = MemoryCredentialStore::with_token(Token::parse("tok").expect("valid token"));

    let first = launch(store.clone(), [UserInput::ForceLogout]).await;
    assert_eq!(first, vec![Route::Home, Route::Login]);
    assert!(store.stored().is_some());

    let second = launch(store, []).await;
    assert_eq!(second, vec![Route::Home]);
}
