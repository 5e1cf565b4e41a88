// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted session mirror backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `session`: key → value bytes, with exactly three keys:
//!   - `accessToken` → UTF-8 token
//!   - `refreshToken` → UTF-8 token
//!   - `user` → JSON-serialized [`Profile`]
//!
//! The three keys are always written together and removed together inside a
//! single write transaction, so a crash can never leave a partial session.

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::warn;

use crate::error::VaultResult;
use crate::models::{Profile, Session, TokenPair};

const SESSION: TableDefinition<&str, &[u8]> = TableDefinition::new("session");

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// All-or-nothing store for the current session.
pub struct SessionVault {
    db: Database,
}

impl SessionVault {
    /// Open (or create) the vault at the given path.
    pub fn open(path: &Path) -> VaultResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::prepare(Database::create(path)?)
    }

    /// Vault that lives only for the lifetime of the process.
    pub fn in_memory() -> VaultResult<Self> {
        Self::prepare(Database::builder().create_with_backend(InMemoryBackend::new())?)
    }

    fn prepare(db: Database) -> VaultResult<Self> {
        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSION)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Persist tokens and profile in one transaction.
    pub fn save(&self, session: &Session) -> VaultResult<()> {
        let user = serde_json::to_vec(&session.profile)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION)?;
            table.insert(ACCESS_TOKEN_KEY, session.tokens.access_token.as_bytes())?;
            table.insert(REFRESH_TOKEN_KEY, session.tokens.refresh_token.as_bytes())?;
            table.insert(USER_KEY, user.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove all three keys in one transaction.
    pub fn clear(&self) -> VaultResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION)?;
            table.remove(ACCESS_TOKEN_KEY)?;
            table.remove(REFRESH_TOKEN_KEY)?;
            table.remove(USER_KEY)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Read the persisted session.
    ///
    /// Returns `Ok(None)` when any key is missing, the token is not valid
    /// UTF-8, or the profile blob fails to parse. Only storage-level failures
    /// are errors.
    pub fn load(&self) -> VaultResult<Option<Session>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSION)?;

        let read = |key: &str| -> VaultResult<Option<Vec<u8>>> {
            Ok(table.get(key)?.map(|v| v.value().to_vec()))
        };

        let (Some(access), Some(refresh), Some(user)) = (
            read(ACCESS_TOKEN_KEY)?,
            read(REFRESH_TOKEN_KEY)?,
            read(USER_KEY)?,
        ) else {
            return Ok(None);
        };

        let (Ok(access), Ok(refresh)) = (String::from_utf8(access), String::from_utf8(refresh))
        else {
            warn!("Persisted tokens are not valid UTF-8, ignoring stored session");
            return Ok(None);
        };

        let profile: Profile = match serde_json::from_slice(&user) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Failed to parse persisted user, ignoring stored session");
                return Ok(None);
            }
        };

        Ok(Session::new(profile, TokenPair::new(access, refresh)))
    }

    /// Number of session keys currently stored.
    pub fn key_count(&self) -> VaultResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSION)?;
        let mut count = 0;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if table.get(key)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &str, value: &[u8]) -> VaultResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_session() -> Session {
        let mut profile = Profile::minimal("1", "a");
        profile.bio = Some("hi".to_string());
        Session::new(profile, TokenPair::new("T1", "T2")).unwrap()
    }

    #[test]
    fn empty_vault_loads_nothing() {
        let vault = SessionVault::in_memory().unwrap();
        assert!(vault.load().unwrap().is_none());
        assert_eq!(vault.key_count().unwrap(), 0);
    }

    #[test]
    fn save_then_load_returns_same_session() {
        let vault = SessionVault::in_memory().unwrap();
        let session = sample_session();
        vault.save(&session).unwrap();
        assert_eq!(vault.key_count().unwrap(), 3);
        assert_eq!(vault.load().unwrap(), Some(session));
    }

    #[test]
    fn clear_removes_all_keys() {
        let vault = SessionVault::in_memory().unwrap();
        vault.save(&sample_session()).unwrap();
        vault.clear().unwrap();
        assert_eq!(vault.key_count().unwrap(), 0);
        assert!(vault.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_user_blob_is_treated_as_absent() {
        let vault = SessionVault::in_memory().unwrap();
        vault.save(&sample_session()).unwrap();
        vault.put_raw(USER_KEY, b"{not json").unwrap();
        assert!(vault.load().unwrap().is_none());
    }

    #[test]
    fn partial_keys_are_treated_as_absent() {
        let vault = SessionVault::in_memory().unwrap();
        vault.put_raw(ACCESS_TOKEN_KEY, b"T1").unwrap();
        assert!(vault.load().unwrap().is_none());
    }

    #[test]
    fn file_vault_survives_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("session.redb");
        let session = sample_session();

        {
            let vault = SessionVault::open(&path).unwrap();
            vault.save(&session).unwrap();
        }

        let vault = SessionVault::open(&path).unwrap();
        assert_eq!(vault.load().unwrap(), Some(session));
    }
}
