//! Chaotic credential store wrapper for fault injection testing
//!
//! Randomly fails reads, writes and erases so tests can verify that checks
//! fail closed and that failed logins and logouts leave the session
//! consistent.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{Arc, Mutex};

use authgate_core::{CredentialStore, CredentialStoreError, Token};

/// Chaotic store wrapper that randomly injects failures
///
/// Delegates to an underlying store but fails operations with probability
/// `failure_rate`. Uses Arc<Mutex<>> for the RNG state, making it Clone and
/// thread-safe. The same seed yields the same failure sequence.
#[derive(Clone)]
pub struct ChaoticCredentialStore<S: CredentialStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Operations attempted, failed or not
    operation_count: Arc<Mutex<usize>>,
}

/// Linear congruential generator. Reproducible with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // Numerical Recipes constants
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S: CredentialStore> ChaoticCredentialStore<S> {
    /// Wrap `inner` with the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Wrap `inner` with an explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Underlying store (for checking what actually persisted).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total operations attempted.
    pub fn operation_count(&self) -> usize {
        #[allow(clippy::expect_used)]
        *self.operation_count.lock().expect("operation_count mutex poisoned")
    }

    /// Count the operation and roll for failure.
    fn roll(&self, operation: &'static str) -> Result<(), CredentialStoreError> {
        #[allow(clippy::expect_used)]
        {
            *self.operation_count.lock().expect("operation_count mutex poisoned") += 1;
        }

        #[allow(clippy::expect_used)]
        let fail =
            self.rng.lock().expect("ChaoticRng mutex poisoned").should_fail(self.failure_rate);

        if fail {
            tracing::debug!(operation, "injecting credential store failure");
            return Err(CredentialStoreError::Io("chaotic failure injection".to_string()));
        }
        Ok(())
    }
}

impl<S: CredentialStore> CredentialStore for ChaoticCredentialStore<S> {
    async fn read(&self) -> Result<Option<Token>, CredentialStoreError> {
        self.roll("read")?;
        self.inner.read().await
    }

    async fn write(&self, token: &Token) -> Result<(), CredentialStoreError> {
        self.roll("write")?;
        self.inner.write(token).await
    }

    async fn erase(&self) -> Result<(), CredentialStoreError> {
        self.roll("erase")?;
        self.inner.erase().await
    }
}
