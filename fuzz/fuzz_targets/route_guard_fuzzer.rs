//! Fuzz target for route parsing and guard decisions
//!
//! # Invariants
//!
//! - A parsed route prints back to a path that parses to the same route
//! - Guards never allow a stack the gate forbids
//! - Redirects always land in the stack the gate allows

#![no_main]

use arbitrary::Arbitrary;
use authgate_core::{GateState, Guard, GuardDecision, Route, Stack};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    path: String,
    logged_in: bool,
    loading: bool,
    from_entry: bool,
}

fuzz_target!(|input: Input| {
    let parsed = input.path.parse::<Route>();
    if let Ok(route) = parsed {
        assert_eq!(route.to_string().parse::<Route>(), Ok(route));
    }

    let gate = if input.loading {
        GateState::Pending
    } else if input.logged_in {
        GateState::Authenticated
    } else {
        GateState::Unauthenticated
    };
    let allowed = if input.logged_in { Stack::Authenticated } else { Stack::Unauthenticated };

    let guard = match (input.from_entry, parsed) {
        (false, Ok(route)) => Guard::for_stack(route.stack()),
        _ => Guard::Entry,
    };

    match guard.evaluate(gate) {
        GuardDecision::Defer => assert_eq!(gate, GateState::Pending),
        GuardDecision::Allow => {
            assert_ne!(gate, GateState::Pending);
            assert_ne!(guard, Guard::Entry);
            assert_eq!(guard, Guard::for_stack(allowed));
        },
        GuardDecision::Redirect(target) => {
            assert_ne!(gate, GateState::Pending);
            assert_eq!(target, allowed.default_route());
        },
    }
});
