//! Operations for model-based testing.
//!
//! Operations represent all possible actions against the gate. They are
//! generated randomly by proptest (or decoded from fuzzer bytes) and applied
//! to both the model and the real implementation.

use arbitrary::Arbitrary;
use authgate_core::{AuthError, Route};

use crate::sim_store::StoreOp;

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Re-check the stored credential.
    Check,

    /// Sign in.
    Login {
        /// Credential submitted.
        credential: ModelCredential,
    },

    /// Sign out.
    Logout,

    /// Clear the session locally.
    ForceClear,

    /// User navigates to a screen.
    Navigate {
        /// Index into [`Route::ALL`], wrapped.
        route: u8,
    },

    /// Fail the next store call of this kind.
    ArmFault {
        /// Store operation to fail.
        op: StoreOp,
    },
}

impl Operation {
    /// Route targeted by a [`Operation::Navigate`].
    pub fn route(index: u8) -> Route {
        Route::ALL[usize::from(index) % Route::ALL.len()]
    }
}

/// Credential shapes worth distinguishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelCredential {
    /// A well-formed credential, derived from the seed.
    Valid(u8),
    /// Empty input.
    Empty,
    /// Contains inner whitespace.
    Whitespace,
    /// No credential; resume the stored one.
    Resume,
}

impl ModelCredential {
    /// Raw text handed to `login`. `None` resumes.
    pub fn raw(self) -> Option<String> {
        match self {
            Self::Valid(seed) => Some(format!("token-{seed:03}")),
            Self::Empty => Some(String::new()),
            Self::Whitespace => Some("two words".to_string()),
            Self::Resume => None,
        }
    }

    /// Credential passes validation (or is a resume).
    pub fn is_well_formed(self) -> bool {
        !matches!(self, Self::Empty | Self::Whitespace)
    }
}

/// Result of applying an operation.
///
/// Used to compare model and real system behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded, or had nothing to report.
    Ok,

    /// Operation failed with expected error.
    Error(OperationError),
}

impl OperationResult {
    /// Classify a provider result.
    pub fn from_auth(result: Result<(), AuthError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(err) => Self::Error(OperationError::from(&err)),
        }
    }
}

/// Expected errors, compared by kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Credential rejected before reaching the store.
    InvalidCredential,

    /// Session could not be established.
    LoginFailure,

    /// Stored credential could not be erased.
    LogoutFailure,

    /// Another transition was in flight.
    Busy,

    /// Anything else. Never expected from sequential operations.
    Unexpected,
}

impl From<&AuthError> for OperationError {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidCredential { .. } => Self::InvalidCredential,
            AuthError::LoginFailure { .. } => Self::LoginFailure,
            AuthError::LogoutFailure { .. } => Self::LogoutFailure,
            AuthError::TransitionInFlight { .. } => Self::Busy,
            AuthError::CheckFailure { .. } | AuthError::StaleTicket { .. } => Self::Unexpected,
        }
    }
}
