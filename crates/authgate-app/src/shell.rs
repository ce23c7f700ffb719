//! Navigation shell state machine.
//!
//! The [`Shell`] owns the user's location in the navigation tree and applies
//! the routing guards to it. It is a pure state machine: it consumes
//! [`ShellEvent`]s and [`UserInput`]s and produces [`ShellAction`]s for the
//! runtime to execute.
//!
//! # Responsibilities
//!
//! - Re-evaluates the guard for the current location on every snapshot
//!   change, redirecting when the location's stack is no longer allowed.
//! - Routes user navigation through the target stack's guard.
//! - Tracks a transient status line for progress and failures.

use authgate_core::{AuthSnapshot, GateState, Guard, GuardDecision, Route, Token};

use crate::{ShellAction, ShellEvent, UserInput};

/// Where the user is in the navigation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Application entry, before the first redirect.
    Entry,
    /// A screen inside one of the stacks.
    Screen(Route),
}

impl Location {
    /// Guard protecting this location.
    pub fn guard(self) -> Guard {
        match self {
            Self::Entry => Guard::Entry,
            Self::Screen(route) => Guard::for_stack(route.stack()),
        }
    }
}

/// Transient status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Operation in progress. Cleared when the session settles.
    Progress(String),
    /// Operation failed. Kept until replaced.
    Error(String),
}

/// Navigation shell state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Current location.
    location: Location,
    /// Last gate state seen.
    gate: GateState,
    /// Status line. `None` if nothing to report.
    status: Option<Status>,
}

impl Shell {
    /// Create a shell at the entry point, waiting for the first check.
    pub fn new() -> Self {
        Self { location: Location::Entry, gate: GateState::Pending, status: None }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: ShellEvent) -> Vec<ShellAction> {
        match event {
            ShellEvent::AuthChanged(snapshot) => self.auth_changed(snapshot),
            ShellEvent::LoginFailed { reason } => {
                self.status = Some(Status::Error(format!("Sign in failed: {reason}")));
                vec![ShellAction::Render]
            },
            ShellEvent::LogoutFailed { reason } => {
                self.status = Some(Status::Error(format!("Sign out failed: {reason}")));
                vec![ShellAction::Render]
            },
            ShellEvent::Tick => vec![],
        }
    }

    /// Translate a user intent into actions.
    pub fn handle_input(&mut self, input: UserInput) -> Vec<ShellAction> {
        match input {
            UserInput::Navigate(route) => self.navigate(route),
            UserInput::Login { credential } => self.login(credential.as_deref()),
            UserInput::Logout => self.logout(),
            UserInput::ForceLogout => self.force_logout(),
            UserInput::Refetch => self.refetch(),
            UserInput::Quit => self.quit(),
        }
    }

    /// Navigate to `route`, subject to its stack's guard.
    ///
    /// Ignored while the session is pending.
    pub fn navigate(&mut self, route: Route) -> Vec<ShellAction> {
        match Guard::for_stack(route.stack()).evaluate(self.gate) {
            GuardDecision::Defer => vec![],
            GuardDecision::Allow => {
                self.location = Location::Screen(route);
                vec![ShellAction::Render]
            },
            GuardDecision::Redirect(target) => self.redirect(target),
        }
    }

    /// Sign in with `credential`, or resume the stored one when `None`.
    ///
    /// Malformed credentials are rejected here without reaching the provider.
    pub fn login(&mut self, credential: Option<&str>) -> Vec<ShellAction> {
        let token = match credential.map(Token::parse).transpose() {
            Ok(token) => token,
            Err(err) => {
                self.status = Some(Status::Error(format!("Sign in failed: {err}")));
                return vec![ShellAction::Render];
            },
        };

        self.status = Some(Status::Progress("Signing in...".to_string()));
        vec![ShellAction::Login { token }, ShellAction::Render]
    }

    /// Sign out.
    pub fn logout(&mut self) -> Vec<ShellAction> {
        self.status = Some(Status::Progress("Signing out...".to_string()));
        vec![ShellAction::Logout, ShellAction::Render]
    }

    /// Drop the local session after a failed sign out.
    pub fn force_logout(&mut self) -> Vec<ShellAction> {
        vec![ShellAction::ForceLogout, ShellAction::Render]
    }

    /// Re-check the stored credential.
    pub fn refetch(&self) -> Vec<ShellAction> {
        vec![ShellAction::Refetch]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<ShellAction> {
        vec![ShellAction::Quit]
    }

    /// Current location.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Last gate state seen.
    pub fn gate(&self) -> GateState {
        self.gate
    }

    /// Status line. `None` if nothing to report.
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Screen to draw. `None` while pending or before the first redirect.
    pub fn visible_screen(&self) -> Option<Route> {
        match (self.gate, self.location) {
            (GateState::Pending, _) | (_, Location::Entry) => None,
            (_, Location::Screen(route)) => Some(route),
        }
    }

    fn auth_changed(&mut self, snapshot: AuthSnapshot) -> Vec<ShellAction> {
        self.gate = snapshot.gate();

        if self.gate != GateState::Pending && matches!(self.status, Some(Status::Progress(_))) {
            self.status = None;
        }

        match self.location.guard().evaluate(self.gate) {
            GuardDecision::Defer | GuardDecision::Allow => vec![ShellAction::Render],
            GuardDecision::Redirect(target) => self.redirect(target),
        }
    }

    fn redirect(&mut self, target: Route) -> Vec<ShellAction> {
        self.location = Location::Screen(target);
        vec![ShellAction::Redirect { route: target }, ShellAction::Render]
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGGED_OUT: AuthSnapshot = AuthSnapshot { is_logged_in: false, is_loading: false };
    const LOGGED_IN: AuthSnapshot = AuthSnapshot { is_logged_in: true, is_loading: false };
    const LOADING_IN: AuthSnapshot = AuthSnapshot { is_logged_in: true, is_loading: true };

    fn settled_shell(snapshot: AuthSnapshot) -> Shell {
        let mut shell = Shell::new();
        let _ = shell.handle(ShellEvent::AuthChanged(snapshot));
        shell
    }

    #[test]
    fn renders_nothing_while_pending() {
        let mut shell = Shell::new();
        let actions = shell.handle(ShellEvent::AuthChanged(AuthSnapshot::INITIAL));

        assert_eq!(actions, vec![ShellAction::Render]);
        assert_eq!(shell.location(), Location::Entry);
        assert_eq!(shell.visible_screen(), None);
    }

    #[test]
    fn entry_redirects_to_login_when_logged_out() {
        let mut shell = Shell::new();
        let actions = shell.handle(ShellEvent::AuthChanged(LOGGED_OUT));

        assert_eq!(actions, vec![ShellAction::Redirect { route: Route::Login }, ShellAction::Render]);
        assert_eq!(shell.visible_screen(), Some(Route::Login));
    }

    #[test]
    fn entry_redirects_to_home_when_logged_in() {
        let shell = settled_shell(LOGGED_IN);
        assert_eq!(shell.visible_screen(), Some(Route::Home));
    }

    #[test]
    fn login_screen_ejects_logged_in_user() {
        let mut shell = settled_shell(LOGGED_OUT);
        let actions = shell.handle(ShellEvent::AuthChanged(LOGGED_IN));

        assert_eq!(actions, vec![ShellAction::Redirect { route: Route::Home }, ShellAction::Render]);
        assert_eq!(shell.location(), Location::Screen(Route::Home));
    }

    #[test]
    fn authenticated_screen_ejects_logged_out_user() {
        let mut shell = settled_shell(LOGGED_IN);
        let _ = shell.navigate(Route::Profile);

        let actions = shell.handle(ShellEvent::AuthChanged(LOGGED_OUT));
        assert_eq!(actions, vec![ShellAction::Redirect { route: Route::Login }, ShellAction::Render]);
    }

    #[test]
    fn pending_hides_screen_but_keeps_location() {
        let mut shell = settled_shell(LOGGED_IN);
        let _ = shell.navigate(Route::Explore);

        let actions = shell.handle(ShellEvent::AuthChanged(LOADING_IN));
        assert_eq!(actions, vec![ShellAction::Render]);
        assert_eq!(shell.visible_screen(), None);
        assert_eq!(shell.location(), Location::Screen(Route::Explore));
    }

    #[test]
    fn navigation_into_forbidden_stack_is_redirected() {
        let mut shell = settled_shell(LOGGED_OUT);
        let actions = shell.navigate(Route::Profile);

        assert_eq!(actions, vec![ShellAction::Redirect { route: Route::Login }, ShellAction::Render]);
        assert_eq!(shell.visible_screen(), Some(Route::Login));
    }

    #[test]
    fn navigation_within_allowed_stack() {
        let mut shell = settled_shell(LOGGED_OUT);
        assert_eq!(shell.navigate(Route::Signup), vec![ShellAction::Render]);
        assert_eq!(shell.visible_screen(), Some(Route::Signup));
    }

    #[test]
    fn navigation_ignored_while_pending() {
        let mut shell = Shell::new();
        assert!(shell.navigate(Route::Home).is_empty());
        assert_eq!(shell.location(), Location::Entry);
    }

    #[test]
    fn login_with_malformed_credential_never_reaches_provider() {
        let mut shell = settled_shell(LOGGED_OUT);
        let actions = shell.login(Some("two words"));

        assert_eq!(actions, vec![ShellAction::Render]);
        assert!(matches!(shell.status(), Some(Status::Error(_))));
    }

    #[test]
    fn progress_cleared_when_session_settles() {
        let mut shell = settled_shell(LOGGED_OUT);
        let actions = shell.login(Some("tok"));
        assert!(matches!(actions.first(), Some(ShellAction::Login { token: Some(_) })));
        assert!(matches!(shell.status(), Some(Status::Progress(_))));

        let _ = shell.handle(ShellEvent::AuthChanged(LOGGED_IN));
        assert_eq!(shell.status(), None);
    }

    #[test]
    fn failure_status_survives_settlement() {
        let mut shell = settled_shell(LOGGED_IN);
        let _ = shell.logout();
        let _ = shell.handle(ShellEvent::AuthChanged(LOGGED_IN));
        let _ = shell.handle(ShellEvent::LogoutFailed { reason: "disk full".to_string() });

        assert_eq!(shell.status(), Some(&Status::Error("Sign out failed: disk full".to_string())));
        assert_eq!(shell.visible_screen(), Some(Route::Home));
    }

    #[test]
    fn input_dispatch() {
        let mut shell = settled_shell(LOGGED_IN);
        assert_eq!(shell.handle_input(UserInput::Quit), vec![ShellAction::Quit]);
        assert_eq!(shell.handle_input(UserInput::Refetch), vec![ShellAction::Refetch]);
        assert_eq!(
            shell.handle_input(UserInput::ForceLogout),
            vec![ShellAction::ForceLogout, ShellAction::Render]
        );
        assert_eq!(
            shell.handle_input(UserInput::Login { credential: None }),
            vec![ShellAction::Login { token: None }, ShellAction::Render]
        );
    }
}
