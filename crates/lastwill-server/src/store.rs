//! Persistent ledger state.
//!
//! The ledger lives in a single JSON file under the data directory. Each
//! command invocation loads it, applies one operation, and writes it back;
//! the watch daemon only reads.

use lastwill_ledger::{AccountId, Timestamp, WillLedger};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed store for a single `WillLedger`.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger from disk, if a state file exists.
    pub fn load(&self) -> Result<Option<WillLedger>, StoreError> {
        if self.path.exists() {
            let contents = fs::read_to_string(&self.path)?;
            let ledger: WillLedger = serde_json::from_str(&contents)?;
            Ok(Some(ledger))
        } else {
            Ok(None)
        }
    }

    /// Load the ledger, creating a fresh one for `owner` if no state file
    /// exists yet. A newly created ledger is persisted immediately so the
    /// owner identity is pinned from first start.
    pub fn load_or_init(
        &self,
        owner: AccountId,
        now: Timestamp,
    ) -> Result<WillLedger, StoreError> {
        match self.load()? {
            Some(ledger) => Ok(ledger),
            None => {
                let ledger = WillLedger::new(owner, now);
                self.save(&ledger)?;
                Ok(ledger)
            }
        }
    }

    /// Save the ledger to disk.
    pub fn save(&self, ledger: &WillLedger) -> Result<(), StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(ledger)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastwill_ledger::Timeout;
    use tempfile::tempdir;

    fn owner() -> AccountId {
        AccountId::new("alice").unwrap()
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger_state.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_or_init_pins_owner() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger_state.json"));

        let ledger = store.load_or_init(owner(), 100).unwrap();
        assert_eq!(ledger.owner(), &owner());
        assert_eq!(ledger.last_visited(), 100);

        // Second start with a different configured owner keeps the original
        let other = AccountId::new("eve").unwrap();
        let reloaded = store.load_or_init(other, 200).unwrap();
        assert_eq!(reloaded.owner(), &owner());
        assert_eq!(reloaded.last_visited(), 100);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("nested/dir/ledger_state.json"));

        let mut ledger = store.load_or_init(owner(), 0).unwrap();
        let heir = AccountId::new("bob").unwrap();
        ledger
            .set_will(&owner(), heir.clone(), Timeout::from_secs(3_600).unwrap(), 5)
            .unwrap();
        ledger.deposit(&owner(), 900, 6).unwrap();
        store.save(&ledger).unwrap();

        let reloaded = store.load().unwrap().unwrap();
        assert_eq!(reloaded, ledger);
        assert_eq!(reloaded.recipient(), Some(&heir));
        assert_eq!(reloaded.balance(), 900);
    }
}
