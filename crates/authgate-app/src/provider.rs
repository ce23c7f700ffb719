//! Auth state provider.
//!
//! The [`AuthProvider`] is the single source of truth for the session. It is
//! constructed once at the application root and shared by `Arc`; every screen
//! reads the same snapshot through [`AuthProvider::snapshot`] or a watch
//! receiver from [`AuthProvider::subscribe`].
//!
//! The provider is a thin async shell around the pure
//! [`SessionMachine`](authgate_core::SessionMachine): it begins an operation
//! under the lock, awaits the credential store with the lock released, then
//! settles the operation and publishes the result. Snapshots are published
//! while the lock is held, so subscribers see them in the order the machine
//! produced them and before the operation's future resolves.

use std::{
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use authgate_core::{
    AuthError, AuthSnapshot, CheckTicket, CredentialStore, CredentialStoreError, LogLevel,
    SessionAction, SessionMachine, Settlement, Token, TransitionKind, TransitionTicket,
};
use tokio::sync::watch;

use crate::ProviderConfig;

/// Shared authentication state provider.
///
/// # Concurrency
///
/// At most one login or logout is in flight; a second one fails with
/// [`AuthError::TransitionInFlight`]. Checks are last-writer-wins by issuance
/// order. A check requested while a transition is in flight is skipped, and
/// a transition supersedes any outstanding check.
///
/// Dropping an operation's future before it completes settles the operation,
/// so the session never stays loading. A dropped check keeps the login state
/// unless no operation has settled yet, in which case it fails closed.
pub struct AuthProvider<S: CredentialStore> {
    store: S,
    config: ProviderConfig,
    machine: Mutex<SessionMachine>,
    tx: watch::Sender<AuthSnapshot>,
}

impl<S: CredentialStore> AuthProvider<S> {
    /// Create a provider in the initial loading state.
    ///
    /// No check is started; call [`Self::check_auth_state`] (the runtime does
    /// this on startup).
    pub fn new(store: S, config: ProviderConfig) -> Self {
        let machine = SessionMachine::new(config.logout_policy);
        let (tx, _) = watch::channel(machine.snapshot());
        Self { store, config, machine: Mutex::new(machine), tx }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        *self.tx.borrow()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    /// Credential store backing the provider.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configuration in effect.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Login or logout awaiting settlement. `None` if idle.
    pub fn in_flight(&self) -> Option<TransitionKind> {
        self.lock().in_flight()
    }

    /// Read the machine and the published snapshot atomically.
    ///
    /// Publishing happens under the same lock, so the two are consistent.
    pub fn inspect<T>(&self, f: impl FnOnce(&SessionMachine, AuthSnapshot) -> T) -> T {
        let machine = self.lock();
        f(&machine, self.snapshot())
    }

    /// Resolve the session from the credential store.
    ///
    /// Store errors and timeouts fail closed: the session settles as logged
    /// out and the failure is only logged. Skipped while a login or logout is
    /// in flight.
    pub async fn check_auth_state(&self) {
        let ticket = {
            let mut machine = self.lock();
            match machine.begin_check() {
                Ok((ticket, actions)) => {
                    self.execute(actions);
                    ticket
                },
                Err(err) => {
                    tracing::debug!(%err, "skipping check");
                    return;
                },
            }
        };

        let mut pending = PendingOp::check(self, ticket);
        let result = bounded(self.config.check_timeout, self.store.read())
            .await
            .map_err(AuthError::check);
        pending.settle_check(result);
    }

    /// Re-run the credential check.
    pub async fn refetch(&self) {
        self.check_auth_state().await;
    }

    /// Establish a session.
    ///
    /// `Some(credential)` validates and stores the credential. `None` resumes
    /// the credential already in the store.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredential` if `credential` is malformed
    /// - `AuthError::TransitionInFlight` if a login or logout is pending
    /// - `AuthError::LoginFailure` if the store fails, times out, or has no
    ///   credential to resume
    pub async fn login(&self, credential: Option<&str>) -> Result<(), AuthError> {
        let token = credential.map(Token::parse).transpose()?;
        let ticket = self.begin_transition(TransitionKind::Login)?;
        let mut pending = PendingOp::transition(self, ticket);

        let limit = self.config.operation_timeout;
        let result = match token {
            Some(token) => bounded(limit, self.store.write(&token))
                .await
                .map(|()| token)
                .map_err(AuthError::login),
            None => match bounded(limit, self.store.read()).await {
                Ok(Some(token)) => Ok(token),
                Ok(None) => Err(AuthError::login("no stored credential to resume")),
                Err(err) => Err(AuthError::login(err)),
            },
        };

        pending.settle_login(result)
    }

    /// Tear down the session and erase the stored credential.
    ///
    /// # Errors
    ///
    /// - `AuthError::TransitionInFlight` if a login or logout is pending
    /// - `AuthError::LogoutFailure` if the store fails or times out. Whether
    ///   the local session survives depends on the configured
    ///   [`LogoutPolicy`](authgate_core::LogoutPolicy).
    pub async fn logout(&self) -> Result<(), AuthError> {
        let ticket = self.begin_transition(TransitionKind::Logout)?;
        let mut pending = PendingOp::transition(self, ticket);

        let result = bounded(self.config.operation_timeout, self.store.erase())
            .await
            .map_err(AuthError::logout);

        pending.settle_logout(result)
    }

    /// Clear the session locally without touching the credential store.
    ///
    /// Recovery path after a failed logout.
    ///
    /// # Errors
    ///
    /// - `AuthError::TransitionInFlight` if a login or logout is pending
    pub fn force_clear(&self) -> Result<(), AuthError> {
        let mut machine = self.lock();
        match machine.force_clear() {
            Ok(actions) => {
                self.execute(actions);
                Ok(())
            },
            Err(err) => {
                tracing::warn!(%err, "force clear rejected");
                Err(err)
            },
        }
    }

    fn begin_transition(&self, kind: TransitionKind) -> Result<TransitionTicket, AuthError> {
        let mut machine = self.lock();
        match machine.begin_transition(kind) {
            Ok((ticket, actions)) => {
                self.execute(actions);
                Ok(ticket)
            },
            Err(err) => {
                tracing::warn!(%err, "transition rejected");
                Err(err)
            },
        }
    }

    /// Lock the machine. A poisoned lock still holds a consistent machine:
    /// every mutation completes before the guard is released.
    fn lock(&self) -> MutexGuard<'_, SessionMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute machine actions. Called with the machine lock held.
    fn execute(&self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Publish(snapshot) => {
                    self.tx.send_replace(snapshot);
                },
                SessionAction::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!("{message}"),
                    LogLevel::Info => tracing::info!("{message}"),
                    LogLevel::Warn => tracing::warn!("{message}"),
                },
            }
        }
    }

    fn settle(
        &self,
        complete: impl FnOnce(&mut SessionMachine) -> Settlement,
    ) -> Result<(), AuthError> {
        let mut machine = self.lock();
        let settlement = complete(&mut machine);
        self.execute(settlement.actions);
        settlement.result
    }
}

/// Await a store call, bounded by `limit`.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, CredentialStoreError>>,
) -> Result<T, CredentialStoreError> {
    tokio::time::timeout(limit, call).await.unwrap_or(Err(CredentialStoreError::Timeout(limit)))
}

/// Operation begun on the machine and not yet settled.
///
/// If dropped unsettled (the caller's future was cancelled mid-await), a
/// transition is settled as failed and a check is settled without changing
/// the login state.
struct PendingOp<'a, S: CredentialStore> {
    provider: &'a AuthProvider<S>,
    ticket: Option<Ticket>,
}

#[derive(Clone, Copy)]
enum Ticket {
    Check(CheckTicket),
    Transition(TransitionTicket),
}

impl<'a, S: CredentialStore> PendingOp<'a, S> {
    fn check(provider: &'a AuthProvider<S>, ticket: CheckTicket) -> Self {
        Self { provider, ticket: Some(Ticket::Check(ticket)) }
    }

    fn transition(provider: &'a AuthProvider<S>, ticket: TransitionTicket) -> Self {
        Self { provider, ticket: Some(Ticket::Transition(ticket)) }
    }

    fn settle_check(&mut self, result: Result<Option<Token>, AuthError>) {
        if let Some(Ticket::Check(ticket)) = self.ticket.take() {
            let mut machine = self.provider.lock();
            let actions = machine.complete_check(ticket, result);
            self.provider.execute(actions);
        }
    }

    fn settle_login(&mut self, result: Result<Token, AuthError>) -> Result<(), AuthError> {
        match self.ticket.take() {
            Some(Ticket::Transition(ticket)) => {
                self.provider.settle(|machine| machine.complete_login(ticket, result))
            },
            _ => Err(AuthError::StaleTicket { operation: "complete_login" }),
        }
    }

    fn settle_logout(&mut self, result: Result<(), AuthError>) -> Result<(), AuthError> {
        match self.ticket.take() {
            Some(Ticket::Transition(ticket)) => {
                self.provider.settle(|machine| machine.complete_logout(ticket, result))
            },
            _ => Err(AuthError::StaleTicket { operation: "complete_logout" }),
        }
    }
}

impl<S: CredentialStore> Drop for PendingOp<'_, S> {
    fn drop(&mut self) {
        match self.ticket {
            Some(Ticket::Check(ticket)) => {
                self.ticket = None;
                let mut machine = self.provider.lock();
                let actions = machine.cancel_check(ticket);
                self.provider.execute(actions);
            },
            Some(Ticket::Transition(ticket)) => {
                let result = match ticket.kind() {
                    TransitionKind::Login => self.settle_login(Err(AuthError::login("cancelled"))),
                    TransitionKind::Logout => {
                        self.settle_logout(Err(AuthError::logout("cancelled")))
                    },
                };
                if let Err(err) = result {
                    tracing::debug!(%err, "cancelled transition settled");
                }
            },
            None => {},
        }
    }
}
