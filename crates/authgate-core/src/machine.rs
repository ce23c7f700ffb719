//! Session state machine.
//!
//! Owns the [`AuthSession`] and decides every state change. Uses the action
//! pattern: callers begin an operation and receive a ticket, perform the
//! credential-store I/O themselves, then settle the operation with the ticket
//! and the I/O result. Each call returns the [`SessionAction`]s the caller must
//! execute (publish the new snapshot, emit a log line).
//!
//! # State Machine
//!
//! ```text
//!                    begin_check / begin_transition
//!   ┌─────────┐  ────────────────────────────────────>  ┌──────────┐
//!   │ Settled │                                         │ Loading  │
//!   └─────────┘  <────────────────────────────────────  └──────────┘
//!        ^          complete_check / complete_login /        │
//!        │          complete_logout (current ticket)         │ stale ticket:
//!        │                                                   │ discarded
//!   force_clear                                              v
//! ```
//!
//! # Ordering
//!
//! - At most one login or logout is in flight. A second one is rejected with
//!   [`AuthError::TransitionInFlight`] and does not touch state.
//! - Checks are ordered by issuance: beginning a check supersedes any
//!   outstanding one, and beginning a transition supersedes any outstanding
//!   check. Superseded checks settle as no-ops.

use std::{fmt, str::FromStr};

use crate::{
    error::AuthError,
    session::{AuthSession, AuthSnapshot},
    token::Token,
};

/// Kind of session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Establish a session.
    Login,
    /// Tear down the session.
    Logout,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Logout => f.write_str("logout"),
        }
    }
}

/// What a failed logout does to the local session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LogoutPolicy {
    /// Keep the session. The caller retries or calls `force_clear`.
    #[default]
    Strict,
    /// Clear the session locally even though the store still holds the
    /// credential.
    ClearLocally,
}

impl fmt::Display for LogoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::ClearLocally => f.write_str("clear-locally"),
        }
    }
}

impl FromStr for LogoutPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "clear-locally" => Ok(Self::ClearLocally),
            other => Err(format!("unknown logout policy '{other}' (expected strict|clear-locally)")),
        }
    }
}

/// Handle for an outstanding credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket {
    id: u64,
}

impl CheckTicket {
    /// Issuance number. Later checks have larger ids.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Handle for an in-flight login or logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTicket {
    kind: TransitionKind,
    id: u64,
}

impl TransitionTicket {
    /// Transition this ticket was issued for.
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Issuance number.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Severity for [`SessionAction::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Routine bookkeeping (superseded checks, resolutions).
    Debug,
    /// Session established or torn down.
    Info,
    /// Fail-closed check or rejected transition.
    Warn,
}

/// Side effects requested by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Deliver this snapshot to every subscriber.
    Publish(AuthSnapshot),

    /// Emit a log line.
    Log {
        /// Severity
        level: LogLevel,
        /// Message text (never contains credentials)
        message: String,
    },
}

/// Outcome of settling a login or logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Actions to execute, whether or not the transition succeeded.
    pub actions: Vec<SessionAction>,
    /// Result to hand back to the caller.
    pub result: Result<(), AuthError>,
}

/// Ticketed session state machine.
///
/// Pure: no I/O, no clocks, no locking. The owner serializes access.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    /// The session record.
    session: AuthSession,
    /// Behaviour of a failed logout.
    logout_policy: LogoutPolicy,
    /// At least one operation has settled since construction.
    settled: bool,
    /// Next ticket id. Shared by checks and transitions.
    next_id: u64,
    /// Id of the check whose result will be accepted.
    outstanding_check: Option<u64>,
    /// Login or logout awaiting settlement.
    in_flight: Option<TransitionTicket>,
}

impl SessionMachine {
    /// Create a machine in the initial loading state.
    pub fn new(logout_policy: LogoutPolicy) -> Self {
        Self {
            session: AuthSession::new(),
            logout_policy,
            settled: false,
            next_id: 1,
            outstanding_check: None,
            in_flight: None,
        }
    }

    /// The session record.
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Current observable snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.session.snapshot()
    }

    /// Configured logout failure behaviour.
    pub fn logout_policy(&self) -> LogoutPolicy {
        self.logout_policy
    }

    /// Transition awaiting settlement. `None` if idle.
    pub fn in_flight(&self) -> Option<TransitionKind> {
        self.in_flight.map(|t| t.kind)
    }

    /// A check has been issued and not yet settled or superseded.
    pub fn check_outstanding(&self) -> bool {
        self.outstanding_check.is_some()
    }

    /// At least one check or transition has settled.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Start a credential check.
    ///
    /// Supersedes any outstanding check.
    ///
    /// # Errors
    ///
    /// - `AuthError::TransitionInFlight` while a login or logout is pending
    pub fn begin_check(&mut self) -> Result<(CheckTicket, Vec<SessionAction>), AuthError> {
        if let Some(in_flight) = self.in_flight {
            return Err(AuthError::TransitionInFlight {
                requested: "check",
                in_flight: in_flight.kind,
            });
        }

        let id = self.issue();
        let mut actions = Vec::with_capacity(2);

        if let Some(previous) = self.outstanding_check.replace(id) {
            actions.push(debug(format!("check #{id} supersedes check #{previous}")));
        }

        actions.push(self.publish());
        Ok((CheckTicket { id }, actions))
    }

    /// Settle a credential check with the store lookup result.
    ///
    /// A present token authenticates the session. A failed lookup fails
    /// closed. Results for superseded checks are discarded.
    pub fn complete_check(
        &mut self,
        ticket: CheckTicket,
        result: Result<Option<Token>, AuthError>,
    ) -> Vec<SessionAction> {
        if self.outstanding_check != Some(ticket.id) {
            return vec![debug(format!("discarding result of superseded check #{}", ticket.id))];
        }

        self.outstanding_check = None;
        self.settled = true;

        let mut actions = Vec::with_capacity(2);
        match result {
            Ok(token) => {
                let authenticated = token.is_some();
                self.session.set_token(token);
                actions.push(debug(format!(
                    "check #{} resolved: authenticated={authenticated}",
                    ticket.id
                )));
            },
            Err(err) => {
                self.session.set_token(None);
                actions.push(SessionAction::Log {
                    level: LogLevel::Warn,
                    message: format!("check #{} failed closed: {err}", ticket.id),
                });
            },
        }

        actions.push(self.publish());
        actions
    }

    /// Settle a check whose lookup was abandoned before it resolved.
    ///
    /// The session keeps its login state. Only a machine that has never
    /// settled fails closed, so an abandoned initial check still ends
    /// unauthenticated. Superseded checks are discarded as usual.
    pub fn cancel_check(&mut self, ticket: CheckTicket) -> Vec<SessionAction> {
        if self.outstanding_check != Some(ticket.id) {
            return vec![debug(format!(
                "discarding cancellation of superseded check #{}",
                ticket.id
            ))];
        }

        self.outstanding_check = None;

        let mut actions = Vec::with_capacity(2);
        if self.settled {
            actions.push(debug(format!("check #{} cancelled, session kept", ticket.id)));
        } else {
            self.settled = true;
            self.session.set_token(None);
            actions.push(warn(format!("initial check #{} cancelled, failing closed", ticket.id)));
        }

        actions.push(self.publish());
        actions
    }

    /// Start a login or logout.
    ///
    /// Supersedes any outstanding check.
    ///
    /// # Errors
    ///
    /// - `AuthError::TransitionInFlight` while another transition is pending
    pub fn begin_transition(
        &mut self,
        kind: TransitionKind,
    ) -> Result<(TransitionTicket, Vec<SessionAction>), AuthError> {
        if let Some(in_flight) = self.in_flight {
            return Err(AuthError::TransitionInFlight {
                requested: match kind {
                    TransitionKind::Login => "login",
                    TransitionKind::Logout => "logout",
                },
                in_flight: in_flight.kind,
            });
        }

        let ticket = TransitionTicket { kind, id: self.issue() };
        let mut actions = Vec::with_capacity(2);

        if let Some(check) = self.outstanding_check.take() {
            actions.push(debug(format!("{kind} #{} supersedes check #{check}", ticket.id)));
        }

        self.in_flight = Some(ticket);
        actions.push(self.publish());
        Ok((ticket, actions))
    }

    /// Settle a login.
    ///
    /// On success the session holds `token`. On failure the login flag is
    /// left as it was and the error is handed back in the settlement.
    pub fn complete_login(
        &mut self,
        ticket: TransitionTicket,
        result: Result<Token, AuthError>,
    ) -> Settlement {
        if let Err(err) = self.take_transition(ticket, TransitionKind::Login, "complete_login") {
            return Settlement { actions: Vec::new(), result: Err(err) };
        }

        self.settled = true;

        let mut actions = Vec::with_capacity(2);
        let result = match result {
            Ok(token) => {
                self.session.set_token(Some(token));
                actions.push(info(format!("login #{} succeeded", ticket.id)));
                Ok(())
            },
            Err(err) => {
                actions.push(warn(format!("login #{} rejected: {err}", ticket.id)));
                Err(err)
            },
        };

        actions.push(self.publish());
        Settlement { actions, result }
    }

    /// Settle a logout.
    ///
    /// On success the session is cleared. On failure the outcome depends on
    /// the [`LogoutPolicy`]; the error is handed back either way.
    pub fn complete_logout(
        &mut self,
        ticket: TransitionTicket,
        result: Result<(), AuthError>,
    ) -> Settlement {
        if let Err(err) = self.take_transition(ticket, TransitionKind::Logout, "complete_logout") {
            return Settlement { actions: Vec::new(), result: Err(err) };
        }

        self.settled = true;

        let mut actions = Vec::with_capacity(2);
        let result = match result {
            Ok(()) => {
                self.session.set_token(None);
                actions.push(info(format!("logout #{} succeeded", ticket.id)));
                Ok(())
            },
            Err(err) => {
                match self.logout_policy {
                    LogoutPolicy::Strict => {
                        actions.push(warn(format!(
                            "logout #{} failed, session kept: {err}",
                            ticket.id
                        )));
                    },
                    LogoutPolicy::ClearLocally => {
                        self.session.set_token(None);
                        actions.push(warn(format!(
                            "logout #{} failed, session cleared locally: {err}",
                            ticket.id
                        )));
                    },
                }
                Err(err)
            },
        };

        actions.push(self.publish());
        Settlement { actions, result }
    }

    /// Clear the session locally without touching the credential store.
    ///
    /// Supersedes any outstanding check.
    ///
    /// # Errors
    ///
    /// - `AuthError::TransitionInFlight` while a login or logout is pending
    pub fn force_clear(&mut self) -> Result<Vec<SessionAction>, AuthError> {
        if let Some(in_flight) = self.in_flight {
            return Err(AuthError::TransitionInFlight {
                requested: "force_clear",
                in_flight: in_flight.kind,
            });
        }

        let mut actions = Vec::with_capacity(3);
        if let Some(check) = self.outstanding_check.take() {
            actions.push(debug(format!("force_clear supersedes check #{check}")));
        }

        self.settled = true;
        self.session.set_token(None);
        actions.push(info("session force-cleared".to_string()));
        actions.push(self.publish());
        Ok(actions)
    }

    fn issue(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn take_transition(
        &mut self,
        ticket: TransitionTicket,
        expected: TransitionKind,
        operation: &'static str,
    ) -> Result<(), AuthError> {
        if ticket.kind != expected || self.in_flight != Some(ticket) {
            return Err(AuthError::StaleTicket { operation });
        }
        self.in_flight = None;
        Ok(())
    }

    /// Recompute the loading flag and produce a publish action.
    fn publish(&mut self) -> SessionAction {
        let loading =
            !self.settled || self.outstanding_check.is_some() || self.in_flight.is_some();
        self.session.set_loading(loading);
        SessionAction::Publish(self.session.snapshot())
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(LogoutPolicy::default())
    }
}

fn debug(message: String) -> SessionAction {
    SessionAction::Log { level: LogLevel::Debug, message }
}

fn info(message: String) -> SessionAction {
    SessionAction::Log { level: LogLevel::Info, message }
}

fn warn(message: String) -> SessionAction {
    SessionAction::Log { level: LogLevel::Warn, message }
}
