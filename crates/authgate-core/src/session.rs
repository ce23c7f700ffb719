//! Session record and its observable snapshot.
//!
//! [`AuthSession`] is owned by the [`crate::SessionMachine`]. Everything
//! outside the machine sees an [`AuthSnapshot`], a `Copy` value that is always
//! replaced as a whole so readers never observe a half-updated pair of flags.

use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Routing-relevant state derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// A check or transition is outstanding. Nothing is rendered.
    Pending,
    /// Session established.
    Authenticated,
    /// No session, or the last check failed closed.
    Unauthenticated,
}

/// Point-in-time view of the session handed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthSnapshot {
    /// Session is authenticated.
    pub is_logged_in: bool,
    /// A check, login or logout has not settled yet.
    pub is_loading: bool,
}

impl AuthSnapshot {
    /// Snapshot of a freshly constructed session, before the first check.
    pub const INITIAL: Self = Self { is_logged_in: false, is_loading: true };

    /// Gate state used by the routing guard.
    pub fn gate(&self) -> GateState {
        if self.is_loading {
            GateState::Pending
        } else if self.is_logged_in {
            GateState::Authenticated
        } else {
            GateState::Unauthenticated
        }
    }
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl From<AuthSnapshot> for GateState {
    fn from(snapshot: AuthSnapshot) -> Self {
        snapshot.gate()
    }
}

/// The session record.
///
/// Mutated only by [`crate::SessionMachine`].
#[derive(Debug, Clone)]
pub struct AuthSession {
    is_logged_in: bool,
    is_loading: bool,
    token: Option<Token>,
}

impl AuthSession {
    /// Create a session in the initial loading state.
    pub fn new() -> Self {
        Self { is_logged_in: false, is_loading: true, token: None }
    }

    /// Session is authenticated.
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// A check, login or logout has not settled yet.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Credential backing the session. `None` when logged out.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Copy of the observable flags.
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot { is_logged_in: self.is_logged_in, is_loading: self.is_loading }
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Replace the credential. Login state follows its presence.
    pub(crate) fn set_token(&mut self, token: Option<Token>) {
        self.is_logged_in = token.is_some();
        self.token = token;
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}
