//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state so every check sees
//! one consistent view.

use authgate_app::{AuthProvider, Location, Shell};
use authgate_core::{AuthSnapshot, CredentialStore, GateState, Route, TransitionKind};
use serde::Serialize;

/// Snapshot of the entire system state.
///
/// Either half may be absent: render-time checks only see the shell, while
/// provider-level tests have no shell at all.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemSnapshot {
    /// Provider state. `None` if not captured.
    pub session: Option<SessionSnapshot>,
    /// Shell state. `None` if not captured.
    pub shell: Option<ShellSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture provider and shell together.
    pub fn capture<S: CredentialStore>(provider: &AuthProvider<S>, shell: &Shell) -> Self {
        Self { session: Some(SessionSnapshot::capture(provider)), shell: Some(ShellSnapshot::capture(shell)) }
    }

    /// Capture the provider only.
    pub fn from_provider<S: CredentialStore>(provider: &AuthProvider<S>) -> Self {
        Self { session: Some(SessionSnapshot::capture(provider)), shell: None }
    }

    /// Capture the shell only.
    pub fn from_shell(shell: &Shell) -> Self {
        Self { session: None, shell: Some(ShellSnapshot::capture(shell)) }
    }
}

/// Provider state, read under the provider lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Snapshot last delivered to subscribers.
    pub published: AuthSnapshot,
    /// Session record's login flag.
    pub is_logged_in: bool,
    /// Session record's loading flag.
    pub is_loading: bool,
    /// Session holds a credential.
    pub has_token: bool,
    /// A check is outstanding.
    pub check_outstanding: bool,
    /// Transition awaiting settlement.
    #[serde(skip)]
    pub in_flight: Option<TransitionKind>,
}

impl SessionSnapshot {
    /// Read the provider's machine.
    pub fn capture<S: CredentialStore>(provider: &AuthProvider<S>) -> Self {
        provider.inspect(|machine, published| {
            let session = machine.session();
            Self {
                published,
                is_logged_in: session.is_logged_in(),
                is_loading: session.is_loading(),
                has_token: session.token().is_some(),
                check_outstanding: machine.check_outstanding(),
                in_flight: machine.in_flight(),
            }
        })
    }
}

/// Shell state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShellSnapshot {
    /// Gate state the shell last saw.
    pub gate: GateState,
    /// Screen being drawn. `None` while pending or at entry.
    pub visible_screen: Option<Route>,
    /// The user is still at the entry point.
    pub at_entry: bool,
}

impl ShellSnapshot {
    /// Read the shell.
    pub fn capture(shell: &Shell) -> Self {
        Self {
            gate: shell.gate(),
            visible_screen: shell.visible_screen(),
            at_entry: shell.location() == Location::Entry,
        }
    }
}
