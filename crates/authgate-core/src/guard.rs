//! Routing guard policy.
//!
//! Pure functions of the [`GateState`]. The guard holds no state and never
//! retries; it is re-evaluated every time the session snapshot changes.
//!
//! | Guard                  | Pending | Authenticated    | Unauthenticated   |
//! |------------------------|---------|------------------|-------------------|
//! | `Entry`                | Defer   | Redirect(Home)   | Redirect(Login)   |
//! | `UnauthenticatedStack` | Defer   | Redirect(Home)   | Allow             |
//! | `AuthenticatedStack`   | Defer   | Allow            | Redirect(Login)   |

use serde::{Deserialize, Serialize};

use crate::{
    route::{Route, Stack},
    session::GateState,
};

/// Result of evaluating a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session not resolved yet. Render nothing.
    Defer,
    /// The guarded stack may be shown.
    Allow,
    /// Leave for this route.
    Redirect(Route),
}

/// Gate points of the navigation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    /// Application entry. Picks the initial stack.
    Entry,
    /// Wraps the login/signup stack.
    UnauthenticatedStack,
    /// Wraps the stack that requires a session.
    AuthenticatedStack,
}

impl Guard {
    /// Guard wrapping `stack`.
    pub fn for_stack(stack: Stack) -> Self {
        match stack {
            Stack::Unauthenticated => Self::UnauthenticatedStack,
            Stack::Authenticated => Self::AuthenticatedStack,
        }
    }

    /// Decide what the guarded location should do in `gate`.
    pub fn evaluate(self, gate: GateState) -> GuardDecision {
        match (self, gate) {
            (_, GateState::Pending) => GuardDecision::Defer,
            (Self::Entry | Self::UnauthenticatedStack, GateState::Authenticated) => {
                GuardDecision::Redirect(Stack::Authenticated.default_route())
            },
            (Self::Entry | Self::AuthenticatedStack, GateState::Unauthenticated) => {
                GuardDecision::Redirect(Stack::Unauthenticated.default_route())
            },
            (Self::UnauthenticatedStack, GateState::Unauthenticated)
            | (Self::AuthenticatedStack, GateState::Authenticated) => GuardDecision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATES: [GateState; 3] =
        [GateState::Pending, GateState::Authenticated, GateState::Unauthenticated];

    #[test]
    fn every_guard_defers_while_pending() {
        for guard in [Guard::Entry, Guard::UnauthenticatedStack, Guard::AuthenticatedStack] {
            assert_eq!(guard.evaluate(GateState::Pending), GuardDecision::Defer);
        }
    }

    #[test]
    fn entry_picks_initial_stack() {
        assert_eq!(
            Guard::Entry.evaluate(GateState::Authenticated),
            GuardDecision::Redirect(Route::Home)
        );
        assert_eq!(
            Guard::Entry.evaluate(GateState::Unauthenticated),
            GuardDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn unauthenticated_stack_ejects_logged_in_user() {
        assert_eq!(
            Guard::UnauthenticatedStack.evaluate(GateState::Authenticated),
            GuardDecision::Redirect(Route::Home)
        );
        assert_eq!(
            Guard::UnauthenticatedStack.evaluate(GateState::Unauthenticated),
            GuardDecision::Allow
        );
    }

    #[test]
    fn authenticated_stack_ejects_logged_out_user() {
        assert_eq!(
            Guard::AuthenticatedStack.evaluate(GateState::Unauthenticated),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(Guard::AuthenticatedStack.evaluate(GateState::Authenticated), GuardDecision::Allow);
    }

    #[test]
    fn redirects_always_land_in_an_allowed_stack() {
        for guard in [Guard::Entry, Guard::UnauthenticatedStack, Guard::AuthenticatedStack] {
            for gate in GATES {
                if let GuardDecision::Redirect(route) = guard.evaluate(gate) {
                    let landing = Guard::for_stack(route.stack()).evaluate(gate);
                    assert_eq!(landing, GuardDecision::Allow, "{guard:?} in {gate:?} -> {route}");
                }
            }
        }
    }
}
