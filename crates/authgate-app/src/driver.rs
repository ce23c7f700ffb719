//! Driver trait for abstracting platform I/O.
//!
//! The [`Driver`] trait decouples the runtime from specific front ends. Each
//! front end implements it to provide input, rendering and navigation, while
//! the generic [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use crate::{NavigationController, Shell, UserInput};

/// Abstracts platform I/O for the application runtime.
///
/// # Implementations
///
/// - **TUI**: crossterm key events, ratatui rendering
/// - **Simulation**: scripted input, recorded renders and redirects
pub trait Driver: NavigationController + Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next user intent.
    ///
    /// Returns `None` if nothing arrived within the driver's polling interval.
    /// Must be cancel-safe: the runtime drops this future when the session
    /// changes first.
    fn poll_input(&mut self) -> impl Future<Output = Result<Option<UserInput>, Self::Error>> + Send;

    /// Render the shell.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, shell: &Shell) -> Result<(), Self::Error>;

    /// Called once by the runtime after the loop ends.
    fn stop(&mut self);
}
