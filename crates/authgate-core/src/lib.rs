//! Authgate core
//!
//! Pure, I/O-free building blocks for the authentication gate: the session
//! record and its observable snapshot, the ticketed session state machine, the
//! route table and the routing guard policy.
//!
//! # Architecture
//!
//! Nothing in this crate performs I/O or awaits. The [`SessionMachine`] follows
//! the action pattern: callers begin an operation, perform the I/O themselves,
//! then settle the operation with its result and execute the returned
//! [`SessionAction`]s. The async provider in `authgate-app` is a thin shell
//! around it.
//!
//! # Components
//!
//! - [`AuthSession`] / [`AuthSnapshot`]: the session record and its `Copy` view
//! - [`SessionMachine`]: begin/complete transitions with tickets
//! - [`Route`] / [`Stack`]: the two mutually exclusive navigation stacks
//! - [`Guard`]: redirect policy evaluated against a [`GateState`]
//! - [`CredentialStore`]: capability trait for secure credential storage

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod credential;
pub mod error;
pub mod guard;
pub mod machine;
pub mod route;
pub mod session;
pub mod token;

pub use credential::{CredentialStore, CredentialStoreError};
pub use error::AuthError;
pub use guard::{Guard, GuardDecision};
pub use machine::{
    CheckTicket, LogLevel, LogoutPolicy, SessionAction, SessionMachine, Settlement,
    TransitionKind, TransitionTicket,
};
pub use route::{Route, Stack, UnknownRoute};
pub use session::{AuthSession, AuthSnapshot, GateState};
pub use token::{MAX_TOKEN_LEN, Token};
