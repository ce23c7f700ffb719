//! End-to-end routing scenarios.
//!
//! The real [`Runtime`] runs against a [`SimDriver`] and a
//! [`SimCredentialStore`], with the standard invariants checked on every
//! render. Redirect traces are pinned with inline snapshots.

use std::sync::Arc;

use authgate_app::{AuthProvider, ProviderConfig, Runtime, UserInput};
use authgate_core::{CredentialStoreError, GateState, Route, Token};
use authgate_harness::{InvariantRegistry, RenderedFrame, SimCredentialStore, SimDriver, StoreOp};

fn token(raw: &str) -> Token {
    Token::parse(raw).expect("valid token")
}

fn driver(inputs: impl IntoIterator<Item = UserInput>) -> SimDriver {
    SimDriver::scripted(inputs).with_invariants(InvariantRegistry::standard())
}

async fn run(driver: &SimDriver, store: &SimCredentialStore) {
    let provider = Arc::new(AuthProvider::new(store.clone(), ProviderConfig::default()));
    Runtime::new(driver.clone(), provider).run().await.expect("runtime");
}

fn login(raw: &str) -> UserInput {
    UserInput::Login { credential: Some(raw.to_string()) }
}

#[tokio::test]
async fn logged_out_start_lands_on_login() {
    let store = SimCredentialStore::new();
    let driver = driver([]);
    run(&driver, &store).await;

    insta::assert_json_snapshot!(driver.frames(), @r#"
    [
      {
        "gate": "pending",
        "screen": null,
        "status": null
      },
      {
        "gate": "unauthenticated",
        "screen": "login",
        "status": null
      }
    ]
    "#);
    assert!(driver.is_stopped());
}

#[tokio::test]
async fn login_redirects_to_home_without_navigation() {
    let store = SimCredentialStore::new();
    let driver = driver([login("tok")]);
    run(&driver, &store).await;

    insta::assert_json_snapshot!(driver.redirects(), @r#"
    [
      "login",
      "home"
    ]
    "#);
    assert_eq!(store.stored(), Some(token("tok")));
}

#[tokio::test]
async fn logout_guards_out_authenticated_screen() {
    let store = SimCredentialStore::with_token(token("tok"));
    let driver = driver([UserInput::Navigate(Route::Profile), UserInput::Logout]);
    run(&driver, &store).await;

    insta::assert_json_snapshot!(driver.redirects(), @r#"
    [
      "home",
      "login"
    ]
    "#);
    assert!(driver.frames().iter().any(|frame| frame.screen == Some(Route::Profile)));
    assert_eq!(
        driver.last_frame().map(|frame| frame.screen),
        Some(Some(Route::Login))
    );
    assert_eq!(store.stored(), None);
}

#[tokio::test]
async fn rejected_login_keeps_user_on_login_with_error() {
    for (input, fault) in [(login("two words"), false), (login("tok"), true)] {
        let store = SimCredentialStore::new();
        if fault {
            store.fail_next(StoreOp::Write, CredentialStoreError::Io("disk full".to_string()));
        }
        let driver = driver([input]);
        run(&driver, &store).await;

        assert_eq!(driver.redirects(), vec![Route::Login]);
        let last = driver.last_frame().expect("frame");
        assert_eq!(last.gate, GateState::Unauthenticated);
        assert_eq!(last.screen, Some(Route::Login));
        let status = last.status.expect("error status");
        assert!(status.starts_with("Sign in failed"), "{status}");
    }
}

#[tokio::test]
async fn navigation_into_forbidden_stack_redirects() {
    let store = SimCredentialStore::new();
    let driver = driver([
        UserInput::Navigate(Route::Signup),
        UserInput::Navigate(Route::Explore),
    ]);
    run(&driver, &store).await;

    insta::assert_json_snapshot!(driver.redirects(), @r#"
    [
      "login",
      "login"
    ]
    "#);
    assert!(driver.frames().iter().any(|frame| frame.screen == Some(Route::Signup)));
}

#[tokio::test]
async fn splash_is_shown_while_login_is_in_flight() {
    let store = SimCredentialStore::new();
    store.hold(StoreOp::Write);
    let driver = driver([login("tok")]).keep_alive();

    let script = async {
        store.blocked_on(StoreOp::Write).await;
        while driver.last_frame().map(|frame| frame.gate) != Some(GateState::Pending) {
            tokio::task::yield_now().await;
        }

        let during = driver.last_frame().expect("frame");
        assert_eq!(during.gate, GateState::Pending);
        assert_eq!(during.screen, None);
        assert_eq!(during.status.as_deref(), Some("Signing in..."));

        store.release(StoreOp::Write);
        driver.inject(UserInput::Quit);
    };
    tokio::join!(run(&driver, &store), script);

    assert_eq!(
        driver.last_frame(),
        Some(RenderedFrame { gate: GateState::Authenticated, screen: Some(Route::Home), status: None })
    );
}

#[tokio::test]
async fn force_logout_recovers_from_failed_logout() {
    let store = SimCredentialStore::with_token(token("tok"));
    store.fail_next(StoreOp::Erase, CredentialStoreError::Unavailable("locked".to_string()));
    let driver = driver([UserInput::Logout, UserInput::ForceLogout]);
    run(&driver, &store).await;

    insta::assert_json_snapshot!(driver.redirects(), @r#"
    [
      "home",
      "login"
    ]
    "#);
    assert!(
        driver
            .frames()
            .iter()
            .any(|frame| frame.status.as_deref().is_some_and(|s| s.starts_with("Sign out failed")))
    );
    assert_eq!(store.stored(), Some(token("tok")));
}
