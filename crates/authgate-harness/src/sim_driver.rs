//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`authgate_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use authgate_app::{Driver, NavigationController, RouteHistory, Shell, Status, UserInput};
use authgate_core::{GateState, Route};
use serde::Serialize;

use crate::invariants::{InvariantRegistry, SystemSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// What was on screen after one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFrame {
    /// Gate state the shell saw.
    pub gate: GateState,
    /// Screen drawn. `None` means the splash.
    pub screen: Option<Route>,
    /// Status line text, if any.
    pub status: Option<String>,
}

impl RenderedFrame {
    fn capture(shell: &Shell) -> Self {
        let status = shell.status().map(|status| match status {
            Status::Progress(text) | Status::Error(text) => text.clone(),
        });
        Self { gate: shell.gate(), screen: shell.visible_screen(), status }
    }
}

/// Shared state for input injection.
///
/// This allows injection from outside async contexts.
struct SharedState {
    inputs: VecDeque<UserInput>,
    frames: Vec<RenderedFrame>,
    history: RouteHistory,
    quit_when_idle: bool,
    stopped: bool,
    fail_render: Option<String>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            inputs: VecDeque::new(),
            frames: Vec::new(),
            history: RouteHistory::new(),
            quit_when_idle: true,
            stopped: false,
            fail_render: None,
        }
    }
}

/// Simulation driver for deterministic testing.
///
/// Clones share state, so a test can keep one handle for injection and
/// inspection while the runtime owns the other.
#[derive(Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Create a new simulation driver.
    ///
    /// Quits once the input queue is drained.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver that replays `inputs` and then quits.
    pub fn scripted(inputs: impl IntoIterator<Item = UserInput>) -> Self {
        let driver = Self::new();
        for input in inputs {
            driver.inject(input);
        }
        driver
    }

    /// Keep polling when the input queue is empty instead of quitting.
    ///
    /// The runtime then only stops on an injected [`UserInput::Quit`].
    #[must_use]
    pub fn keep_alive(self) -> Self {
        self.lock().quit_when_idle = false;
        self
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Inject a user input.
    pub fn inject(&self, input: UserInput) {
        self.lock().inputs.push_back(input);
    }

    /// Make the next render fail with `message`.
    pub fn fail_next_render(&self, message: impl Into<String>) {
        self.lock().fail_render = Some(message.into());
    }

    /// Check if there are inputs waiting to be polled.
    pub fn has_pending(&self) -> bool {
        !self.lock().inputs.is_empty()
    }

    /// Every rendered frame, oldest first.
    pub fn frames(&self) -> Vec<RenderedFrame> {
        self.lock().frames.clone()
    }

    /// Most recent frame.
    pub fn last_frame(&self) -> Option<RenderedFrame> {
        self.lock().frames.last().cloned()
    }

    /// Every redirect target, oldest first.
    pub fn redirects(&self) -> Vec<Route> {
        self.lock().history.redirects().to_vec()
    }

    /// The runtime has shut the driver down.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Check invariants against the shell.
    pub fn check_invariants(&self, shell: &Shell, context: &str) {
        if let Some(registry) = &self.invariants {
            registry.assert_all(&SystemSnapshot::from_shell(shell), context);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NavigationController for SimDriver {
    fn redirect(&mut self, route: Route) {
        self.lock().history.redirect(route);
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_input(&mut self) -> Result<Option<UserInput>, Self::Error> {
        let next = {
            let mut state = self.lock();
            match state.inputs.pop_front() {
                Some(input) => Some(input),
                None if state.quit_when_idle => Some(UserInput::Quit),
                None => None,
            }
        };

        if next.is_none() {
            tokio::task::yield_now().await;
        }
        Ok(next)
    }

    fn render(&mut self, shell: &Shell) -> Result<(), Self::Error> {
        self.check_invariants(shell, "after render");

        let mut state = self.lock();
        if let Some(message) = state.fail_render.take() {
            return Err(SimDriverError(message));
        }
        state.frames.push(RenderedFrame::capture(shell));
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use authgate_app::ShellEvent;
    use authgate_core::AuthSnapshot;

    use super::*;

    #[test]
    fn inject_queues_input() {
        let driver = SimDriver::new();
        driver.inject(UserInput::Refetch);

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn drained_queue_quits_by_default() {
        let mut driver = SimDriver::scripted([UserInput::Logout]);

        assert!(matches!(driver.poll_input().await, Ok(Some(UserInput::Logout))));
        assert!(matches!(driver.poll_input().await, Ok(Some(UserInput::Quit))));
    }

    #[tokio::test]
    async fn keep_alive_polls_empty() {
        let mut driver = SimDriver::new().keep_alive();
        assert!(matches!(driver.poll_input().await, Ok(None)));
    }

    #[test]
    fn render_records_frame() {
        let mut driver = SimDriver::new();
        let handle = driver.clone();
        let mut shell = Shell::new();
        let _ = shell.handle(ShellEvent::AuthChanged(AuthSnapshot {
            is_logged_in: false,
            is_loading: false,
        }));

        driver.render(&shell).expect("render");
        assert_eq!(
            handle.last_frame(),
            Some(RenderedFrame {
                gate: GateState::Unauthenticated,
                screen: Some(Route::Login),
                status: None
            })
        );
    }

    #[test]
    fn injected_render_failure_surfaces_once() {
        let mut driver = SimDriver::new();
        driver.fail_next_render("gone");

        assert!(driver.render(&Shell::new()).is_err());
        assert!(driver.render(&Shell::new()).is_ok());
    }
}
