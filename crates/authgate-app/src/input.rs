//! Platform-agnostic user intents.

use std::fmt;

use authgate_core::Route;

/// What the user asked for.
///
/// Drivers translate raw input (keys, taps, scripted steps) into these, so the
/// shell never sees terminal or toolkit types.
#[derive(Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Open a screen.
    Navigate(Route),
    /// Sign in.
    Login {
        /// Raw credential as typed. `None` resumes the stored credential.
        credential: Option<String>,
    },
    /// Sign out.
    Logout,
    /// Discard the local session without touching the store.
    ForceLogout,
    /// Re-check the stored credential.
    Refetch,
    /// Quit.
    Quit,
}

impl fmt::Debug for UserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(route) => f.debug_tuple("Navigate").field(route).finish(),
            Self::Login { credential } => f
                .debug_struct("Login")
                .field("credential", &credential.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::Logout => f.write_str("Logout"),
            Self::ForceLogout => f.write_str("ForceLogout"),
            Self::Refetch => f.write_str("Refetch"),
            Self::Quit => f.write_str("Quit"),
        }
    }
}
