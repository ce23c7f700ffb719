//! Terminal UI for authgate
//!
//! A thin shell over [`authgate_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`authgate_app::Runtime`]
//!
//! This crate only handles key mapping and terminal rendering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod input;
pub mod terminal;
pub mod ui;

pub use authgate_app::{AuthProvider, Driver, Runtime, Shell, UserInput};
pub use cli::{Args, LoggingError, StoreKind};
pub use input::{InputState, KeyInput};
pub use terminal::{TerminalDriver, TerminalError};
