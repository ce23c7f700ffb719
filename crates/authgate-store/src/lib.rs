//! Credential store implementations
//!
//! Implementations of [`authgate_core::CredentialStore`]:
//!
//! - [`MemoryCredentialStore`]: in-process, for tests and simulation
//! - [`RedbCredentialStore`]: durable, survives restarts
//! - [`ChaoticCredentialStore`]: wraps another store and injects failures

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
mod memory;
mod redb;

pub use chaotic::ChaoticCredentialStore;
pub use memory::MemoryCredentialStore;

pub use self::redb::RedbCredentialStore;
