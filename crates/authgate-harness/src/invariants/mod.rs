//! Session and routing invariants.
//!
//! Each check reads a [`SystemSnapshot`]: the provider's machine and
//! published snapshot (taken under the provider lock) and what the shell is
//! drawing. The [`crate::SimDriver`] runs the standard set on every render;
//! property tests run it between steps.
//!
//! ```ignore
//! let snapshot = SystemSnapshot::capture(&provider, runtime.shell());
//! InvariantRegistry::standard().assert_all(&snapshot, "after logout");
//! ```

mod checks;
mod snapshot;

pub use checks::{
    LoadingWhileOutstanding, LoggedInImpliesToken, NothingRenderedWhilePending,
    PublishedMatchesSession, VisibleStackMatchesGate,
};
pub use snapshot::{SessionSnapshot, ShellSnapshot, SystemSnapshot};

/// Outcome of one check.
pub type InvariantResult = Result<(), Violation>;

/// A check that failed.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Snake-case name of the check, e.g. `nothing_rendered_while_pending`.
    pub invariant: &'static str,
    /// Observed state that broke it.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property of the session or the shell.
///
/// Checks skip the half of the snapshot they need when it was not captured.
pub trait Invariant: Send + Sync {
    /// Name reported in a [`Violation`].
    fn name(&self) -> &'static str;

    /// Evaluate against one snapshot.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Set of checks run together.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Registry with no checks.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Every session and routing check:
    ///
    /// - [`PublishedMatchesSession`]: subscribers see the session's flags
    /// - [`LoadingWhileOutstanding`]: pending work implies loading
    /// - [`LoggedInImpliesToken`]: a session always has a credential
    /// - [`NothingRenderedWhilePending`]: no screen while pending
    /// - [`VisibleStackMatchesGate`]: visible screen is in the allowed stack
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(PublishedMatchesSession);
        registry.add(LoadingWhileOutstanding);
        registry.add(LoggedInImpliesToken);
        registry.add(NothingRenderedWhilePending);
        registry.add(VisibleStackMatchesGate);
        registry
    }

    /// Register `invariant`.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every check. Collects all violations, not just the first.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Run every check and panic listing the violations, tagged with
    /// `context`.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(|v| v.to_string()).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of checks.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// No checks registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use authgate_core::{GateState, Route};

    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn empty_snapshot_passes_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&SystemSnapshot::empty()).is_ok());
    }

    fn shell(gate: GateState, visible_screen: Option<Route>) -> SystemSnapshot {
        SystemSnapshot {
            session: None,
            shell: Some(ShellSnapshot { gate, visible_screen, at_entry: false }),
        }
    }

    #[test]
    fn screen_drawn_while_pending_is_reported() {
        let registry = InvariantRegistry::standard();
        let violations = registry
            .check_all(&shell(GateState::Pending, Some(Route::Home)))
            .expect_err("screen while pending");

        let names: Vec<_> = violations.iter().map(|v| v.invariant).collect();
        assert!(names.contains(&NothingRenderedWhilePending.name()), "{names:?}");
    }

    #[test]
    fn screen_in_forbidden_stack_is_reported() {
        let registry = InvariantRegistry::standard();
        let violations = registry
            .check_all(&shell(GateState::Unauthenticated, Some(Route::Profile)))
            .expect_err("authenticated screen while logged out");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].invariant, VisibleStackMatchesGate.name());
    }

    #[test]
    fn allowed_screen_passes() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&shell(GateState::Authenticated, Some(Route::Explore))).is_ok());
    }

    #[test]
    fn violation_display_names_invariant() {
        let violation = Violation { invariant: "example", message: "broken".to_string() };
        assert_eq!(violation.to_string(), "example: broken");
    }
}
