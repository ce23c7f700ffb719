//! Integration tests for the generic runtime.
//!
//! Uses a scripted driver that replays inputs and records what was drawn, so
//! the runtime, provider and shell run exactly as they do in the terminal.

use std::{
    collections::VecDeque,
    convert::Infallible,
    sync::{Arc, Mutex},
};

use authgate_app::{
    AuthProvider, Driver, NavigationController, ProviderConfig, RouteHistory, Runtime, Shell,
    Status, UserInput,
};
use authgate_core::{CredentialStore, GateState, Route, Token};
use authgate_store::{ChaoticCredentialStore, MemoryCredentialStore};

/// What the driver saw on each render.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    gate: GateState,
    screen: Option<Route>,
}

/// Observations shared between the driver and the test.
#[derive(Debug, Clone, Default)]
struct Report {
    frames: Vec<Frame>,
    statuses: Vec<Option<Status>>,
    history: RouteHistory,
    stops: usize,
}

/// Replays inputs, then quits.
struct ScriptedDriver {
    inputs: VecDeque<UserInput>,
    report: Arc<Mutex<Report>>,
}

impl NavigationController for ScriptedDriver {
    fn redirect(&mut self, route: Route) {
        self.report.lock().expect("report lock").history.redirect(route);
    }
}

impl Driver for ScriptedDriver {
    type Error = Infallible;

    async fn poll_input(&mut self) -> Result<Option<UserInput>, Self::Error> {
        Ok(Some(self.inputs.pop_front().unwrap_or(UserInput::Quit)))
    }

    fn render(&mut self, shell: &Shell) -> Result<(), Self::Error> {
        let mut report = self.report.lock().expect("report lock");
        report.frames.push(Frame { gate: shell.gate(), screen: shell.visible_screen() });
        report.statuses.push(shell.status().cloned());
        Ok(())
    }

    fn stop(&mut self) {
        self.report.lock().expect("report lock").stops += 1;
    }
}

/// Run the script to completion and return what the driver observed.
async fn run_script<S: CredentialStore>(
    provider: Arc<AuthProvider<S>>,
    inputs: Vec<UserInput>,
) -> Report {
    let report = Arc::new(Mutex::new(Report::default()));
    let driver = ScriptedDriver { inputs: inputs.into(), report: Arc::clone(&report) };

    Runtime::new(driver, provider).run().await.expect("infallible");

    report.lock().expect("report lock").clone()
}

fn token(raw: &str) -> Token {
    Token::parse(raw).expect("valid token")
}

#[tokio::test]
async fn first_frame_is_splash_then_login() {
    let provider =
        Arc::new(AuthProvider::new(MemoryCredentialStore::new(), ProviderConfig::default()));
    let report = run_script(provider, vec![]).await;

    assert_eq!(report.frames.first(), Some(&Frame { gate: GateState::Pending, screen: None }));
    assert_eq!(report.history.redirects(), vec![Route::Login]);
    assert_eq!(
        report.frames.last(),
        Some(&Frame { gate: GateState::Unauthenticated, screen: Some(Route::Login) })
    );
    assert_eq!(report.stops, 1, "driver stopped exactly once");
}

#[tokio::test]
async fn stored_credential_lands_on_home() {
    let store = MemoryCredentialStore::with_token(token("tok"));
    let provider = Arc::new(AuthProvider::new(store, ProviderConfig::default()));
    let report = run_script(provider, vec![]).await;

    assert_eq!(report.history.redirects(), vec![Route::Home]);
}

#[tokio::test]
async fn login_then_logout_round_trip() {
    let store = MemoryCredentialStore::new();
    let provider = Arc::new(AuthProvider::new(store.clone(), ProviderConfig::default()));
    let inputs = vec![
        UserInput::Login { credential: Some("tok".to_string()) },
        UserInput::Navigate(Route::Profile),
        UserInput::Logout,
    ];
    let report = run_script(Arc::clone(&provider), inputs).await;

    assert_eq!(report.history.redirects(), vec![Route::Login, Route::Home, Route::Login]);
    assert!(store.stored().is_none());
    assert!(report.frames.iter().any(|f| f.screen == Some(Route::Profile)));
    assert!(!provider.snapshot().is_logged_in);
}

#[tokio::test]
async fn nothing_is_drawn_while_pending() {
    let provider = Arc::new(AuthProvider::new(
        MemoryCredentialStore::with_token(token("tok")),
        ProviderConfig::default(),
    ));
    let inputs = vec![UserInput::Refetch, UserInput::Logout, UserInput::Login { credential: None }];
    let report = run_script(provider, inputs).await;

    for frame in &report.frames {
        if frame.gate == GateState::Pending {
            assert_eq!(frame.screen, None, "{frame:?}");
        }
    }
}

#[tokio::test]
async fn rejected_login_shows_error_and_stays_on_login() {
    let store = ChaoticCredentialStore::new(MemoryCredentialStore::new(), 1.0);
    let provider = Arc::new(AuthProvider::new(store, ProviderConfig::default()));
    let inputs = vec![UserInput::Login { credential: Some("tok".to_string()) }];
    let report = run_script(provider, inputs).await;

    assert_eq!(report.history.redirects(), vec![Route::Login]);
    assert!(matches!(report.statuses.last(), Some(Some(Status::Error(_)))));
    assert_eq!(
        report.frames.last(),
        Some(&Frame { gate: GateState::Unauthenticated, screen: Some(Route::Login) })
    );
}
