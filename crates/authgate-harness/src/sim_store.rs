//! Scriptable credential store for deterministic testing.
//!
//! `SimCredentialStore` behaves like the in-memory store, but tests can arm
//! one-shot failures per operation and hold operations at the store boundary
//! until released. Holding is how tests observe the in-flight window of a
//! check, login or logout.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use arbitrary::Arbitrary;
use authgate_core::{CredentialStore, CredentialStoreError, Token};
use tokio::sync::Notify;

/// Credential store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Arbitrary, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOp {
    /// Load the stored credential.
    Read,
    /// Persist a credential.
    Write,
    /// Remove the stored credential.
    Erase,
}

#[derive(Default)]
struct StoreState {
    stored: Option<Token>,
    faults: HashMap<StoreOp, VecDeque<CredentialStoreError>>,
    held: HashSet<StoreOp>,
    waiting: HashMap<StoreOp, usize>,
    calls: Vec<StoreOp>,
}

/// Credential store with injectable failures and hold points.
///
/// Clone is cheap; clones share state.
#[derive(Clone, Default)]
pub struct SimCredentialStore {
    state: Arc<Mutex<StoreState>>,
    released: Arc<Notify>,
}

impl SimCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`.
    pub fn with_token(token: Token) -> Self {
        let store = Self::new();
        store.seed(Some(token));
        store
    }

    /// Replace the stored credential without recording a call.
    pub fn seed(&self, token: Option<Token>) {
        self.lock().stored = token;
    }

    /// Stored credential, if any.
    pub fn stored(&self) -> Option<Token> {
        self.lock().stored.clone()
    }

    /// Fail the next call of `op` with `err`. Armed failures queue up.
    pub fn fail_next(&self, op: StoreOp, err: CredentialStoreError) {
        self.lock().faults.entry(op).or_default().push_back(err);
    }

    /// Number of armed failures not yet consumed.
    pub fn armed(&self, op: StoreOp) -> usize {
        self.lock().faults.get(&op).map_or(0, VecDeque::len)
    }

    /// Block every call of `op` until [`Self::release`].
    pub fn hold(&self, op: StoreOp) {
        self.lock().held.insert(op);
    }

    /// Let held calls of `op` proceed.
    pub fn release(&self, op: StoreOp) {
        self.lock().held.remove(&op);
        self.released.notify_waiters();
    }

    /// Number of calls of `op` currently blocked by [`Self::hold`].
    pub fn waiting(&self, op: StoreOp) -> usize {
        self.lock().waiting.get(&op).copied().unwrap_or(0)
    }

    /// Wait until at least one call of `op` is blocked.
    ///
    /// Requires the blocked call to be making progress on the same runtime,
    /// typically a spawned task.
    pub async fn blocked_on(&self, op: StoreOp) {
        while self.waiting(op) == 0 {
            tokio::task::yield_now().await;
        }
    }

    /// Every call made, in order.
    pub fn calls(&self) -> Vec<StoreOp> {
        self.lock().calls.clone()
    }

    async fn enter(&self, op: StoreOp) -> Result<(), CredentialStoreError> {
        self.lock().calls.push(op);

        loop {
            let notified = self.released.notified();
            let held = {
                let mut state = self.lock();
                let held = state.held.contains(&op);
                if held {
                    *state.waiting.entry(op).or_default() += 1;
                }
                held
            };
            if !held {
                break;
            }
            notified.await;
            if let Some(count) = self.lock().waiting.get_mut(&op) {
                *count = count.saturating_sub(1);
            }
        }

        match self.lock().faults.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => {
                tracing::debug!(?op, %err, "injected store failure");
                Err(err)
            },
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for SimCredentialStore {
    async fn read(&self) -> Result<Option<Token>, CredentialStoreError> {
        self.enter(StoreOp::Read).await?;
        Ok(self.lock().stored.clone())
    }

    async fn write(&self, token: &Token) -> Result<(), CredentialStoreError> {
        self.enter(StoreOp::Write).await?;
        self.lock().stored = Some(token.clone());
        Ok(())
    }

    async fn erase(&self) -> Result<(), CredentialStoreError> {
        self.enter(StoreOp::Erase).await?;
        self.lock().stored = None;
        Ok(())
    }
}
