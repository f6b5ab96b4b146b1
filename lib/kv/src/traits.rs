use crate::error::KVError;

/// KVStore provides the durable key-value storage interface.
///
/// Keys follow a namespaced convention: `menu:config`, `orders:all`, etc.
/// Each durable record is a whole JSON blob stored under one key; a `set`
/// atomically replaces the previous snapshot.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, atomically replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
