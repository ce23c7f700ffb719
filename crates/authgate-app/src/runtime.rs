//! Generic runtime for application orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`AuthProvider`]: session source of truth
//! - [`Shell`]: navigation state machine
//! - [`Driver`]: platform-specific I/O
//!
//! Snapshot changes always win over user input, so the shell re-evaluates its
//! guards before acting on anything the user did afterwards.

use std::{future::Future, sync::Arc};

use authgate_core::{AuthSnapshot, CredentialStore, Token};
use tokio::sync::watch;

use crate::{AuthProvider, Driver, Shell, ShellAction, ShellEvent};

/// Generic runtime that orchestrates provider, shell and driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `S`: Credential store behind the provider
pub struct Runtime<D, S>
where
    D: Driver,
    S: CredentialStore,
{
    driver: D,
    shell: Shell,
    provider: Arc<AuthProvider<S>>,
    auth_rx: watch::Receiver<AuthSnapshot>,
}

impl<D, S> Runtime<D, S>
where
    D: Driver,
    S: CredentialStore,
{
    /// Create a runtime around a shared provider.
    pub fn new(driver: D, provider: Arc<AuthProvider<S>>) -> Self {
        let auth_rx = provider.subscribe();
        Self { driver, shell: Shell::new(), provider, auth_rx }
    }

    /// Run the main event loop.
    ///
    /// 1. Renders the splash and runs the initial credential check
    /// 2. Applies every published snapshot to the shell
    /// 3. Turns user input into provider operations
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.shell)?;

        let provider = Arc::clone(&self.provider);
        self.drive(provider.check_auth_state()).await?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        tokio::select! {
            biased;

            Ok(()) = self.auth_rx.changed() => {
                let snapshot = *self.auth_rx.borrow_and_update();
                let actions = self.shell.handle(ShellEvent::AuthChanged(snapshot));
                self.process_actions(actions).await
            },
            input = self.driver.poll_input() => {
                match input? {
                    Some(input) => {
                        tracing::debug!(?input, "user input");
                        let actions = self.shell.handle_input(input);
                        self.process_actions(actions).await
                    },
                    None => {
                        let actions = self.shell.handle(ShellEvent::Tick);
                        self.process_actions(actions).await
                    },
                }
            },
        }
    }

    /// Process actions returned by the Shell.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(
        &mut self,
        initial_actions: Vec<ShellAction>,
    ) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    ShellAction::Render => self.driver.render(&self.shell)?,
                    ShellAction::Redirect { route } => self.driver.redirect(route),
                    ShellAction::Quit => return Ok(true),

                    // Session operations go through the provider
                    ShellAction::Login { token } => {
                        let provider = Arc::clone(&self.provider);
                        let credential = token.as_ref().map(Token::expose);
                        if let Err(err) = self.drive(provider.login(credential)).await? {
                            let event = ShellEvent::LoginFailed { reason: err.to_string() };
                            pending_actions.extend(self.shell.handle(event));
                        }
                    },
                    ShellAction::Logout => {
                        let provider = Arc::clone(&self.provider);
                        if let Err(err) = self.drive(provider.logout()).await? {
                            let event = ShellEvent::LogoutFailed { reason: err.to_string() };
                            pending_actions.extend(self.shell.handle(event));
                        }
                    },
                    ShellAction::ForceLogout => {
                        if let Err(err) = self.provider.force_clear() {
                            let event = ShellEvent::LogoutFailed { reason: err.to_string() };
                            pending_actions.extend(self.shell.handle(event));
                        }
                        self.sync_auth()?;
                    },
                    ShellAction::Refetch => {
                        let provider = Arc::clone(&self.provider);
                        self.drive(provider.refetch()).await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Await a provider operation while still applying the snapshots it
    /// publishes, so the pending state is rendered while it is in flight.
    async fn drive<T>(&mut self, operation: impl Future<Output = T>) -> Result<T, D::Error> {
        tokio::pin!(operation);

        let output = loop {
            tokio::select! {
                biased;

                Ok(()) = self.auth_rx.changed() => {
                    let snapshot = *self.auth_rx.borrow_and_update();
                    let actions = self.shell.handle(ShellEvent::AuthChanged(snapshot));
                    self.process_actions_sync(actions)?;
                },
                output = &mut operation => break output,
            }
        };

        self.sync_auth()?;
        Ok(output)
    }

    /// Apply a snapshot published since the last observation, if any.
    fn sync_auth(&mut self) -> Result<(), D::Error> {
        if self.auth_rx.has_changed().unwrap_or(false) {
            let snapshot = *self.auth_rx.borrow_and_update();
            let actions = self.shell.handle(ShellEvent::AuthChanged(snapshot));
            self.process_actions_sync(actions)?;
        }
        Ok(())
    }

    /// Process actions that never start a provider operation.
    fn process_actions_sync(&mut self, actions: Vec<ShellAction>) -> Result<(), D::Error> {
        for action in actions {
            match action {
                ShellAction::Render => self.driver.render(&self.shell)?,
                ShellAction::Redirect { route } => self.driver.redirect(route),

                // Snapshot changes only produce navigation
                ShellAction::Login { .. }
                | ShellAction::Logout
                | ShellAction::ForceLogout
                | ShellAction::Refetch
                | ShellAction::Quit => {
                    tracing::warn!(?action, "unexpected action in sync context");
                },
            }
        }
        Ok(())
    }

    /// Get a reference to the Shell
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Get a reference to the provider
    pub fn provider(&self) -> &Arc<AuthProvider<S>> {
        &self.provider
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
