//! Deterministic simulation harness for the authentication gate.
//!
//! Scriptable implementations of the [`authgate_app::Driver`] and
//! [`authgate_core::CredentialStore`] traits for deterministic, reproducible
//! testing of the provider, the shell and the runtime that joins them.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and real implementation,
//! and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the session
//! and shell invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_driver;
pub mod sim_store;

pub use invariants::{
    Invariant, InvariantRegistry, InvariantResult, LoadingWhileOutstanding, LoggedInImpliesToken,
    NothingRenderedWhilePending, PublishedMatchesSession, SessionSnapshot, ShellSnapshot,
    SystemSnapshot, Violation, VisibleStackMatchesGate,
};
pub use model::{
    ModelCredential, ModelSession, ObservableState, Operation, OperationError, OperationResult,
};
pub use sim_driver::{RenderedFrame, SimDriver, SimDriverError};
pub use sim_store::{SimCredentialStore, StoreOp};
