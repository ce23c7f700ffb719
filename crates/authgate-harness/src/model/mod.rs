//! Reference model for model-based testing.
//!
//! The model is a deliberately simple, sequential description of how the
//! gate must behave: every operation runs to completion before the next
//! starts. Operations are applied to both the model and the real provider and
//! shell, and their observable states are compared.

mod operation;
mod session;

pub use operation::{ModelCredential, Operation, OperationError, OperationResult};
pub use session::{ModelSession, ObservableState};
