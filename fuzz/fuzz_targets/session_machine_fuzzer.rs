//! Fuzz target for the SessionMachine
//!
//! Drive begin/complete pairs in arbitrary order, including stale and
//! duplicated tickets.
//!
//! # Strategy
//!
//! - Checks: begin many, complete or cancel any of them in any order
//! - Transitions: begin while busy, complete with stale tickets
//! - Force clear at arbitrary points
//!
//! # Invariants
//!
//! - Loading iff unsettled, a check is outstanding, or a transition is in flight
//! - Logged in iff the session holds a credential
//! - Every published snapshot equals the machine snapshot at that point
//! - A superseded check never publishes
//! - A cancelled check keeps the login state once the machine has settled
//! - A rejected begin never publishes

#![no_main]

use arbitrary::Arbitrary;
use authgate_core::{
    AuthError, CheckTicket, LogoutPolicy, SessionAction, SessionMachine, Token, TransitionKind,
    TransitionTicket,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum MachineOp {
    BeginCheck,
    CompleteCheck { pick: u8, outcome: CheckOutcome },
    CancelCheck { pick: u8 },
    BeginTransition { logout: bool },
    CompleteTransition { pick: u8, succeed: bool },
    ForceClear,
}

#[derive(Debug, Clone, Arbitrary)]
enum CheckOutcome {
    Found,
    Empty,
    Failed,
}

#[derive(Debug, Arbitrary)]
struct Scenario {
    clear_locally: bool,
    ops: Vec<MachineOp>,
}

fn token() -> Token {
    Token::parse("fuzz-token").expect("valid token")
}

fn published(actions: &[SessionAction]) -> usize {
    actions.iter().filter(|a| matches!(a, SessionAction::Publish(_))).count()
}

fn check_publishes(machine: &SessionMachine, actions: &[SessionAction]) {
    for action in actions {
        if let SessionAction::Publish(snapshot) = action {
            assert_eq!(*snapshot, machine.snapshot(), "published snapshot is stale");
        }
    }
}

fn check_invariants(machine: &SessionMachine) {
    let session = machine.session();
    let outstanding = machine.check_outstanding() || machine.in_flight().is_some();

    assert_eq!(
        session.is_loading(),
        !machine.is_settled() || outstanding,
        "loading flag out of sync"
    );
    assert_eq!(session.is_logged_in(), session.token().is_some(), "login flag without token");
}

fuzz_target!(|scenario: Scenario| {
    let policy =
        if scenario.clear_locally { LogoutPolicy::ClearLocally } else { LogoutPolicy::Strict };
    let mut machine = SessionMachine::new(policy);
    let mut checks: Vec<CheckTicket> = Vec::new();
    let mut transitions: Vec<TransitionTicket> = Vec::new();
    let mut latest_check: Option<CheckTicket> = None;

    for op in scenario.ops {
        match op {
            MachineOp::BeginCheck => match machine.begin_check() {
                Ok((ticket, actions)) => {
                    if let Some(previous) = latest_check {
                        assert!(ticket.id() > previous.id(), "ticket ids must increase");
                    }
                    check_publishes(&machine, &actions);
                    checks.push(ticket);
                    latest_check = Some(ticket);
                },
                Err(err) => {
                    assert!(matches!(err, AuthError::TransitionInFlight { .. }));
                    assert!(machine.in_flight().is_some());
                },
            },
            MachineOp::CompleteCheck { pick, outcome } => {
                if checks.is_empty() {
                    continue;
                }
                let ticket = checks[pick as usize % checks.len()];
                let was_current = machine.check_outstanding() && Some(ticket) == latest_check;
                let before = machine.snapshot();

                let result = match outcome {
                    CheckOutcome::Found => Ok(Some(token())),
                    CheckOutcome::Empty => Ok(None),
                    CheckOutcome::Failed => Err(AuthError::check("fuzz")),
                };
                let actions = machine.complete_check(ticket, result);

                if was_current {
                    assert_eq!(published(&actions), 1);
                    check_publishes(&machine, &actions);
                } else {
                    assert_eq!(published(&actions), 0, "superseded check published");
                    assert_eq!(machine.snapshot(), before);
                }
            },
            MachineOp::CancelCheck { pick } => {
                if checks.is_empty() {
                    continue;
                }
                let ticket = checks[pick as usize % checks.len()];
                let was_current = machine.check_outstanding() && Some(ticket) == latest_check;
                let was_settled = machine.is_settled();
                let before = machine.snapshot();

                let actions = machine.cancel_check(ticket);

                if was_current {
                    assert_eq!(published(&actions), 1);
                    check_publishes(&machine, &actions);
                    if was_settled {
                        assert_eq!(machine.snapshot().is_logged_in, before.is_logged_in);
                    } else {
                        assert!(!machine.snapshot().is_logged_in);
                    }
                } else {
                    assert_eq!(published(&actions), 0, "superseded cancellation published");
                    assert_eq!(machine.snapshot(), before);
                }
            },
            MachineOp::BeginTransition { logout } => {
                let kind = if logout { TransitionKind::Logout } else { TransitionKind::Login };
                let busy = machine.in_flight().is_some();
                match machine.begin_transition(kind) {
                    Ok((ticket, actions)) => {
                        assert!(!busy);
                        assert!(!machine.check_outstanding(), "transition must supersede checks");
                        check_publishes(&machine, &actions);
                        transitions.push(ticket);
                    },
                    Err(err) => {
                        assert!(busy);
                        assert!(matches!(err, AuthError::TransitionInFlight { .. }));
                    },
                }
            },
            MachineOp::CompleteTransition { pick, succeed } => {
                if transitions.is_empty() {
                    continue;
                }
                let ticket = transitions[pick as usize % transitions.len()];
                let current = machine.in_flight().is_some() && transitions.last() == Some(&ticket);
                let before = machine.snapshot();

                let settlement = match ticket.kind() {
                    TransitionKind::Login => {
                        let result = if succeed { Ok(token()) } else { Err(AuthError::login("fuzz")) };
                        machine.complete_login(ticket, result)
                    },
                    TransitionKind::Logout => {
                        let result = if succeed { Ok(()) } else { Err(AuthError::logout("fuzz")) };
                        machine.complete_logout(ticket, result)
                    },
                };

                if current {
                    assert_eq!(settlement.result.is_ok(), succeed);
                    check_publishes(&machine, &settlement.actions);
                    if succeed {
                        assert_eq!(
                            machine.session().is_logged_in(),
                            ticket.kind() == TransitionKind::Login
                        );
                    }
                } else {
                    assert!(matches!(settlement.result, Err(AuthError::StaleTicket { .. })));
                    assert!(settlement.actions.is_empty());
                    assert_eq!(machine.snapshot(), before);
                }
            },
            MachineOp::ForceClear => {
                let busy = machine.in_flight().is_some();
                match machine.force_clear() {
                    Ok(actions) => {
                        assert!(!busy);
                        assert!(!machine.session().is_logged_in());
                        check_publishes(&machine, &actions);
                    },
                    Err(_) => assert!(busy),
                }
            },
        }

        check_invariants(&machine);
    }
});
