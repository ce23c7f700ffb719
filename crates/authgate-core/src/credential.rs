//! Credential store abstraction.
//!
//! The session machine never touches storage. The provider reads, writes and
//! erases the credential through this trait, so production can use a durable
//! store while tests substitute in-memory, chaotic or gated implementations.

use std::{future::Future, time::Duration};

use thiserror::Error;

use crate::token::Token;

/// Errors reported by credential store implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// Underlying storage failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Stored bytes could not be decoded into a credential.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Operation did not finish in time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Store refuses service (locked keychain, revoked access).
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Secure persistent storage for the session credential.
///
/// Must be Clone (shared by the provider and whoever seeds it), Send + Sync,
/// and 'static. Implementations typically share internal state via Arc, so
/// clones access the same underlying credential.
///
/// The store holds at most one credential.
pub trait CredentialStore: Clone + Send + Sync + 'static {
    /// Stored credential. `None` if nothing is stored.
    fn read(&self) -> impl Future<Output = Result<Option<Token>, CredentialStoreError>> + Send;

    /// Store `token`, replacing any previous credential.
    fn write(&self, token: &Token) -> impl Future<Output = Result<(), CredentialStoreError>> + Send;

    /// Remove the stored credential.
    ///
    /// Idempotent - erasing an empty store succeeds.
    fn erase(&self) -> impl Future<Output = Result<(), CredentialStoreError>> + Send;
}
