use std::path::Path;
use std::sync::Arc;

use redb::{Database, TableDefinition};

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// RedbStore is a KVStore implementation backed by redb — a pure-Rust
/// embedded key-value database. Every mutation commits a write transaction,
/// so each stored snapshot is replaced atomically: a crash mid-write leaves
/// the previous committed snapshot intact.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(|e| KVError::Storage(e.to_string()))?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
        })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(TABLE)
            .map_err(|e| KVError::Storage(e.to_string()))?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(KVError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TABLE)
                .map_err(|e| KVError::Storage(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| KVError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(TABLE)
            .map_err(|e| KVError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        let iter = table
            .range(prefix..)
            .map_err(|e| KVError::Storage(e.to_string()))?;

        for entry in iter {
            let entry = entry.map_err(|e| KVError::Storage(e.to_string()))?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            let value = entry.1.value().to_vec();
            results.push((key, value));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store(dir: &tempfile::TempDir) -> RedbStore {
        RedbStore::open(&dir.path().join("data.redb")).unwrap()
    }

    #[test]
    fn set_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store.get("menu:config").unwrap().is_none());

        store.set("menu:config", b"{\"tables\":[]}").unwrap();
        assert_eq!(
            store.get("menu:config").unwrap().unwrap(),
            b"{\"tables\":[]}"
        );

        store.delete("menu:config").unwrap();
        assert!(store.get("menu:config").unwrap().is_none());
    }

    #[test]
    fn set_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store.set("orders:all", b"[]").unwrap();
        store.set("orders:all", b"[{\"id\":\"a\"}]").unwrap();
        assert_eq!(store.get("orders:all").unwrap().unwrap(), b"[{\"id\":\"a\"}]");
    }

    #[test]
    fn scan_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store.set("menu:config", b"m").unwrap();
        store.set("orders:all", b"o").unwrap();

        let hits = store.scan("menu:").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "menu:config");
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            store.set("orders:all", b"[1,2,3]").unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("orders:all").unwrap().unwrap(), b"[1,2,3]");
    }
}
