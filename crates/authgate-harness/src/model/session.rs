//! Model session - the reference implementation.
//!
//! Tracks the store, the session flags and the user's location with plain
//! fields and no concurrency. It is the oracle against which the provider and
//! shell are verified.

use std::collections::HashMap;

use authgate_core::{AuthSnapshot, LogoutPolicy, Route, Stack};

use super::operation::{ModelCredential, Operation, OperationError, OperationResult};
use crate::sim_store::StoreOp;

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Snapshot subscribers see.
    pub snapshot: AuthSnapshot,
    /// Credential in the store.
    pub stored: Option<String>,
    /// Screen being drawn. `None` while pending or at entry.
    pub visible: Option<Route>,
}

/// Reference model of the gate.
#[derive(Debug, Clone)]
pub struct ModelSession {
    policy: LogoutPolicy,
    stored: Option<String>,
    logged_in: bool,
    settled: bool,
    faults: HashMap<StoreOp, usize>,
    location: Option<Route>,
}

impl ModelSession {
    /// Fresh session before the first check, with `stored` in the store.
    pub fn new(policy: LogoutPolicy, stored: Option<String>) -> Self {
        Self {
            policy,
            stored,
            logged_in: false,
            settled: false,
            faults: HashMap::new(),
            location: None,
        }
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let result = match op {
            Operation::Check => {
                self.apply_check();
                OperationResult::Ok
            },
            Operation::Login { credential } => self.apply_login(*credential),
            Operation::Logout => self.apply_logout(),
            Operation::ForceClear => {
                self.settled = true;
                self.logged_in = false;
                OperationResult::Ok
            },
            Operation::Navigate { route } => {
                self.apply_navigate(Operation::route(*route));
                OperationResult::Ok
            },
            Operation::ArmFault { op } => {
                *self.faults.entry(*op).or_default() += 1;
                OperationResult::Ok
            },
        };

        self.follow_guard();
        result
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            snapshot: self.snapshot(),
            stored: self.stored.clone(),
            visible: if self.settled { self.location } else { None },
        }
    }

    /// Snapshot subscribers should see.
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot { is_logged_in: self.logged_in, is_loading: !self.settled }
    }

    fn apply_check(&mut self) {
        self.settled = true;
        self.logged_in = !self.fault(StoreOp::Read) && self.stored.is_some();
    }

    fn apply_login(&mut self, credential: ModelCredential) -> OperationResult {
        if !credential.is_well_formed() {
            return OperationResult::Error(OperationError::InvalidCredential);
        }

        self.settled = true;
        let established = match credential.raw() {
            Some(raw) => {
                let written = !self.fault(StoreOp::Write);
                if written {
                    self.stored = Some(raw);
                }
                written
            },
            None => !self.fault(StoreOp::Read) && self.stored.is_some(),
        };

        if established {
            self.logged_in = true;
            OperationResult::Ok
        } else {
            OperationResult::Error(OperationError::LoginFailure)
        }
    }

    fn apply_logout(&mut self) -> OperationResult {
        self.settled = true;

        if self.fault(StoreOp::Erase) {
            if self.policy == LogoutPolicy::ClearLocally {
                self.logged_in = false;
            }
            return OperationResult::Error(OperationError::LogoutFailure);
        }

        self.stored = None;
        self.logged_in = false;
        OperationResult::Ok
    }

    fn apply_navigate(&mut self, route: Route) {
        if !self.settled {
            return;
        }
        self.location = Some(if route.stack() == self.allowed_stack() {
            route
        } else {
            self.allowed_stack().default_route()
        });
    }

    /// Move the user out of a stack they are no longer allowed in.
    fn follow_guard(&mut self) {
        if !self.settled {
            return;
        }
        let allowed = self.allowed_stack();
        match self.location {
            Some(route) if route.stack() == allowed => {},
            _ => self.location = Some(allowed.default_route()),
        }
    }

    fn allowed_stack(&self) -> Stack {
        if self.logged_in { Stack::Authenticated } else { Stack::Unauthenticated }
    }

    /// Consume an armed fault for `op`. Returns true if the call fails.
    fn fault(&mut self, op: StoreOp) -> bool {
        match self.faults.get_mut(&op) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(seed: u8) -> Operation {
        Operation::Login { credential: ModelCredential::Valid(seed) }
    }

    #[test]
    fn starts_pending_with_nothing_visible() {
        let model = ModelSession::new(LogoutPolicy::Strict, None);
        let state = model.observable_state();

        assert_eq!(state.snapshot, AuthSnapshot::INITIAL);
        assert_eq!(state.visible, None);
    }

    #[test]
    fn check_routes_by_stored_credential() {
        let mut model = ModelSession::new(LogoutPolicy::Strict, Some("tok".to_string()));
        model.apply(&Operation::Check);
        assert_eq!(model.observable_state().visible, Some(Route::Home));

        let mut model = ModelSession::new(LogoutPolicy::Strict, None);
        model.apply(&Operation::Check);
        assert_eq!(model.observable_state().visible, Some(Route::Login));
    }

    #[test]
    fn failed_check_fails_closed() {
        let mut model = ModelSession::new(LogoutPolicy::Strict, Some("tok".to_string()));
        model.apply(&Operation::ArmFault { op: StoreOp::Read });
        model.apply(&Operation::Check);

        let state = model.observable_state();
        assert!(!state.snapshot.is_logged_in);
        assert_eq!(state.stored.as_deref(), Some("tok"));
    }

    #[test]
    fn failed_logout_follows_policy() {
        for (policy, stays_logged_in) in
            [(LogoutPolicy::Strict, true), (LogoutPolicy::ClearLocally, false)]
        {
            let mut model = ModelSession::new(policy, None);
            model.apply(&login(1));
            model.apply(&Operation::ArmFault { op: StoreOp::Erase });

            assert_eq!(
                model.apply(&Operation::Logout),
                OperationResult::Error(OperationError::LogoutFailure)
            );
            assert_eq!(model.snapshot().is_logged_in, stays_logged_in, "{policy:?}");
            assert!(model.observable_state().stored.is_some());
        }
    }

    #[test]
    fn invalid_credential_changes_nothing() {
        let mut model = ModelSession::new(LogoutPolicy::Strict, None);
        let result = model.apply(&Operation::Login { credential: ModelCredential::Whitespace });

        assert_eq!(result, OperationResult::Error(OperationError::InvalidCredential));
        assert_eq!(model.snapshot(), AuthSnapshot::INITIAL);
    }

    #[test]
    fn navigation_redirects_out_of_forbidden_stack() {
        let mut model = ModelSession::new(LogoutPolicy::Strict, None);
        model.apply(&Operation::Check);
        model.apply(&Operation::Navigate { route: 4 });

        assert_eq!(model.observable_state().visible, Some(Route::Login));
    }
}
