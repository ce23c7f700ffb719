//! Error types for the authentication gate.
//!
//! One enum covers every failure the session state machine can report. The
//! provider decides which of them reach the caller: check failures are
//! converted into a fail-closed state change, while login and logout failures
//! are returned.

use thiserror::Error;

use crate::machine::TransitionKind;

/// Errors produced by session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Credential lookup failed during a check or refetch.
    ///
    /// Never surfaced to callers; the session fails closed instead.
    #[error("authentication check failed: {reason}")]
    CheckFailure {
        /// What went wrong
        reason: String,
    },

    /// Session could not be established.
    #[error("login failed: {reason}")]
    LoginFailure {
        /// What went wrong
        reason: String,
    },

    /// Session could not be torn down in the credential store.
    #[error("logout failed: {reason}")]
    LogoutFailure {
        /// What went wrong
        reason: String,
    },

    /// Credential rejected before reaching the store.
    #[error("invalid credential: {reason}")]
    InvalidCredential {
        /// Validation rule that failed
        reason: &'static str,
    },

    /// Another login or logout has not settled yet.
    #[error("cannot {requested}: {in_flight} already in flight")]
    TransitionInFlight {
        /// Operation that was refused
        requested: &'static str,
        /// Transition currently pending
        in_flight: TransitionKind,
    },

    /// Operation settled with a ticket that is no longer current.
    #[error("stale ticket passed to {operation}")]
    StaleTicket {
        /// Operation that received the ticket
        operation: &'static str,
    },
}

impl AuthError {
    /// Returns true if repeating the same call may succeed.
    ///
    /// Busy rejections and store failures during checks or logouts are
    /// retryable. Invalid credentials and ticket misuse never are.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransitionInFlight { .. } | Self::CheckFailure { .. } | Self::LogoutFailure { .. }
        )
    }

    /// Wrap any displayable failure as a [`AuthError::LoginFailure`].
    pub fn login(reason: impl std::fmt::Display) -> Self {
        Self::LoginFailure { reason: reason.to_string() }
    }

    /// Wrap any displayable failure as a [`AuthError::LogoutFailure`].
    pub fn logout(reason: impl std::fmt::Display) -> Self {
        Self::LogoutFailure { reason: reason.to_string() }
    }

    /// Wrap any displayable failure as a [`AuthError::CheckFailure`].
    pub fn check(reason: impl std::fmt::Display) -> Self {
        Self::CheckFailure { reason: reason.to_string() }
    }
}
