#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use authgate_core::{CredentialStore, CredentialStoreError, Token};

/// In-memory credential store for testing and simulation
///
/// The credential lives behind Arc<Mutex<>> so clones share it. A poisoned
/// lock is recovered, since every write replaces the whole value. Every
/// operation completes without yielding.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<Mutex<Option<Token>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`.
    pub fn with_token(token: Token) -> Self {
        Self { inner: Arc::new(Mutex::new(Some(token))) }
    }

    /// Stored credential, bypassing the async interface.
    pub fn stored(&self) -> Option<Token> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Token>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn read(&self) -> Result<Option<Token>, CredentialStoreError> {
        Ok(self.lock().clone())
    }

    async fn write(&self, token: &Token) -> Result<(), CredentialStoreError> {
        *self.lock() = Some(token.clone());
        Ok(())
    }

    async fn erase(&self) -> Result<(), CredentialStoreError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: &str) -> Token {
        Token::parse(raw).expect("valid token")
    }

    #[tokio::test]
    async fn write_replaces_and_erase_clears() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.read().await, Ok(None));

        store.write(&token("first")).await.expect("write");
        store.write(&token("second")).await.expect("write");
        assert_eq!(store.read().await.expect("read").as_ref().map(Token::expose), Some("second"));

        store.erase().await.expect("erase");
        store.erase().await.expect("erase is idempotent");
        assert!(store.stored().is_none());
    }

    #[tokio::test]
    async fn clones_share_the_credential() {
        let store = MemoryCredentialStore::with_token(token("shared"));
        let clone = store.clone();

        clone.erase().await.expect("erase");
        assert!(store.stored().is_none());
    }
}
