//! Shell side-effects and intents.
//!
//! [`ShellAction`]s are produced by the [`crate::Shell`] state machine for the
//! runtime to execute.

use authgate_core::{Route, Token};

/// Actions produced by the Shell state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    /// Render the UI.
    Render,

    /// Tell the navigation controller to move to `route`.
    Redirect {
        /// Destination screen.
        route: Route,
    },

    /// Establish a session.
    Login {
        /// Credential to store. `None` resumes the stored one.
        token: Option<Token>,
    },

    /// Tear down the session.
    Logout,

    /// Clear the session locally, leaving the store untouched.
    ForceLogout,

    /// Re-run the credential check.
    Refetch,

    /// Quit the application.
    Quit,
}
