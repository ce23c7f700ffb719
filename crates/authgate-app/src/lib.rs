//! Application layer for authgate
//!
//! The async auth state provider, the pure navigation shell and the generic
//! runtime that connects them to a platform driver. The same runtime runs in
//! the terminal front end and in deterministic simulation.
//!
//! # Components
//!
//! - [`AuthProvider`]: single source of truth for the session, shared via `Arc`
//! - [`Shell`]: navigation state machine (guards, redirects, user intents)
//! - [`Driver`] / [`NavigationController`]: capability traits for platform I/O
//! - [`Runtime`]: orchestration loop over provider, shell and driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod config;
mod driver;
mod event;
mod input;
mod navigation;
mod provider;
mod runtime;
mod shell;

pub use action::ShellAction;
pub use config::ProviderConfig;
pub use driver::Driver;
pub use event::ShellEvent;
pub use input::UserInput;
pub use navigation::{NavigationController, RouteHistory};
pub use provider::AuthProvider;
pub use runtime::Runtime;
pub use shell::{Location, Shell, Status};
