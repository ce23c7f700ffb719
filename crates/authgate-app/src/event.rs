//! Shell input events.
//!
//! Events come from the auth provider (snapshot changes) and from the runtime
//! reporting the outcome of operations it executed on the shell's behalf.

use authgate_core::AuthSnapshot;

/// Events processed by the Shell state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// The provider published a new snapshot.
    AuthChanged(AuthSnapshot),

    /// A login was rejected.
    LoginFailed {
        /// Error description.
        reason: String,
    },

    /// A logout or force-logout was rejected.
    LogoutFailed {
        /// Error description.
        reason: String,
    },

    /// Periodic tick.
    Tick,
}
