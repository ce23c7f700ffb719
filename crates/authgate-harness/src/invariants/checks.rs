//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use authgate_core::{Guard, GuardDecision};

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Subscribers see exactly the session's flags.
///
/// The published snapshot must equal the session record at every quiescent
/// point. A mismatch means a mutation was not published (or was torn).
pub struct PublishedMatchesSession;

impl Invariant for PublishedMatchesSession {
    fn name(&self) -> &'static str {
        "published_matches_session"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(session) = state.session else {
            return Ok(());
        };

        let record = (session.is_logged_in, session.is_loading);
        let published = (session.published.is_logged_in, session.published.is_loading);
        if record != published {
            return Err(Violation {
                invariant: self.name(),
                message: format!("session (logged_in, loading) = {record:?}, published {published:?}"),
            });
        }
        Ok(())
    }
}

/// Loading whenever a check or transition is outstanding.
pub struct LoadingWhileOutstanding;

impl Invariant for LoadingWhileOutstanding {
    fn name(&self) -> &'static str {
        "loading_while_outstanding"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(session) = state.session else {
            return Ok(());
        };

        let outstanding = session.check_outstanding || session.in_flight.is_some();
        if outstanding && !session.is_loading {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "not loading with check_outstanding={} in_flight={:?}",
                    session.check_outstanding, session.in_flight
                ),
            });
        }
        Ok(())
    }
}

/// A logged-in session always holds a credential.
pub struct LoggedInImpliesToken;

impl Invariant for LoggedInImpliesToken {
    fn name(&self) -> &'static str {
        "logged_in_implies_token"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        match state.session {
            Some(session) if session.is_logged_in && !session.has_token => Err(Violation {
                invariant: self.name(),
                message: "logged in without a credential".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Nothing is drawn while the gate is pending.
pub struct NothingRenderedWhilePending;

impl Invariant for NothingRenderedWhilePending {
    fn name(&self) -> &'static str {
        "nothing_rendered_while_pending"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(shell) = state.shell else {
            return Ok(());
        };

        if shell.gate == authgate_core::GateState::Pending && shell.visible_screen.is_some() {
            return Err(Violation {
                invariant: self.name(),
                message: format!("drawing {:?} while pending", shell.visible_screen),
            });
        }
        Ok(())
    }
}

/// The visible screen belongs to the stack the gate allows.
///
/// A logged-in user never sees login/signup, a logged-out user never sees an
/// authenticated screen.
pub struct VisibleStackMatchesGate;

impl Invariant for VisibleStackMatchesGate {
    fn name(&self) -> &'static str {
        "visible_stack_matches_gate"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(shell) = state.shell else {
            return Ok(());
        };
        let Some(route) = shell.visible_screen else {
            return Ok(());
        };

        let decision = Guard::for_stack(route.stack()).evaluate(shell.gate);
        if decision != GuardDecision::Allow {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{route} visible in {:?} ({decision:?})", shell.gate),
            });
        }
        Ok(())
    }
}
