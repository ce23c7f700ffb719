//! Redb-backed durable credential store.
//!
//! The credential survives restarts. Redb transactions block, so every
//! operation runs on the tokio blocking pool.

use std::{path::Path, sync::Arc};

use authgate_core::{CredentialStore, CredentialStoreError, Token};
use redb::{Database, TableDefinition};

/// Table: credentials
/// Key: slot name
/// Value: UTF-8 credential bytes
const CREDENTIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

/// The single slot the session credential lives in.
const SESSION_SLOT: &str = "session";

/// Durable credential store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbCredentialStore {
    db: Arc<Database>,
}

impl RedbCredentialStore {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates the credentials table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `CredentialStoreError::Io` if the database cannot be opened or
    /// created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CredentialStoreError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        let txn = db.begin_write().map_err(io)?;
        {
            let _ = txn.open_table(CREDENTIALS).map_err(io)?;
        }
        txn.commit().map_err(io)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn read_blocking(db: &Database) -> Result<Option<Token>, CredentialStoreError> {
        let txn = db.begin_read().map_err(io)?;
        let table = txn.open_table(CREDENTIALS).map_err(io)?;

        match table.get(SESSION_SLOT).map_err(io)? {
            Some(value) => {
                let raw = std::str::from_utf8(value.value())
                    .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;
                let token = Token::parse(raw)
                    .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;
                Ok(Some(token))
            },
            None => Ok(None),
        }
    }

    fn write_blocking(db: &Database, token: &Token) -> Result<(), CredentialStoreError> {
        let txn = db.begin_write().map_err(io)?;
        {
            let mut table = txn.open_table(CREDENTIALS).map_err(io)?;
            table.insert(SESSION_SLOT, token.expose().as_bytes()).map_err(io)?;
        }
        txn.commit().map_err(io)?;
        Ok(())
    }

    fn erase_blocking(db: &Database) -> Result<(), CredentialStoreError> {
        let txn = db.begin_write().map_err(io)?;
        {
            let mut table = txn.open_table(CREDENTIALS).map_err(io)?;
            let _ = table.remove(SESSION_SLOT).map_err(io)?;
        }
        txn.commit().map_err(io)?;
        Ok(())
    }
}

impl CredentialStore for RedbCredentialStore {
    async fn read(&self) -> Result<Option<Token>, CredentialStoreError> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || Self::read_blocking(&db)).await.map_err(io)?
    }

    async fn write(&self, token: &Token) -> Result<(), CredentialStoreError> {
        let db = Arc::clone(&self.db);
        let token = token.clone();
        tokio::task::spawn_blocking(move || Self::write_blocking(&db, &token)).await.map_err(io)?
    }

    async fn erase(&self) -> Result<(), CredentialStoreError> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || Self::erase_blocking(&db)).await.map_err(io)?
    }
}

fn io(e: impl std::fmt::Display) -> CredentialStoreError {
    CredentialStoreError::Io(e.to_string())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn token(raw: &str) -> Token {
        Token::parse(raw).expect("valid token")
    }

    #[tokio::test]
    async fn empty_database_reads_none() {
        let dir = tempdir().expect("tempdir");
        let store = RedbCredentialStore::open(dir.path().join("creds.redb")).expect("open");

        assert_eq!(store.read().await, Ok(None));
    }

    #[tokio::test]
    async fn write_read_erase() {
        let dir = tempdir().expect("tempdir");
        let store = RedbCredentialStore::open(dir.path().join("creds.redb")).expect("open");

        store.write(&token("abc")).await.expect("write");
        store.write(&token("def")).await.expect("overwrite");
        let stored = store.read().await.expect("read");
        assert_eq!(stored.as_ref().map(Token::expose), Some("def"));

        store.erase().await.expect("erase");
        store.erase().await.expect("erase is idempotent");
        assert_eq!(store.read().await, Ok(None));
    }

    #[tokio::test]
    async fn credential_survives_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("creds.redb");

        {
            let store = RedbCredentialStore::open(&path).expect("open");
            store.write(&token("persisted")).await.expect("write");
        }

        let store = RedbCredentialStore::open(&path).expect("reopen");
        let stored = store.read().await.expect("read");
        assert_eq!(stored.as_ref().map(Token::expose), Some("persisted"));
    }

    #[tokio::test]
    async fn corrupt_credential_is_serialization_error() {
        let dir = tempdir().expect("tempdir");
        let store = RedbCredentialStore::open(dir.path().join("creds.redb")).expect("open");

        write_raw(&store.db, b"two words");
        assert!(matches!(store.read().await, Err(CredentialStoreError::Serialization(_))));
    }

    fn write_raw(db: &Database, bytes: &[u8]) {
        let txn = db.begin_write().expect("begin");
        {
            let mut table = txn.open_table(CREDENTIALS).expect("table");
            table.insert(SESSION_SLOT, bytes).expect("insert");
        }
        txn.commit().expect("commit");
    }
}
