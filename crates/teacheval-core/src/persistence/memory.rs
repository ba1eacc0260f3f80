//! In-memory adapter.

use std::collections::{HashMap, HashSet};

use crate::error::StorageError;

use super::PersistenceAdapter;

/// A hash-map backed adapter with optional fault injection.
#[derive(Debug, Default, Clone)]
pub struct MemoryAdapter {
    values: HashMap<String, String>,
    failing_reads: HashSet<String>,
    failing_writes: HashSet<String>,
    writes: usize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key` with a raw serialized value.
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Make every read of `key` fail.
    pub fn fail_reads_of(mut self, key: &str) -> Self {
        self.failing_reads.insert(key.to_string());
        self
    }

    /// Make every write or removal of `key` fail.
    pub fn fail_writes_of(mut self, key: &str) -> Self {
        self.failing_writes.insert(key.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failing_reads.contains(key) {
            return Err(StorageError::Rejected(key.to_string()));
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing_writes.contains(key) {
            return Err(StorageError::Rejected(key.to_string()));
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.failing_writes.contains(key) {
            return Err(StorageError::Rejected(key.to_string()));
        }
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut adapter = MemoryAdapter::new();
        adapter.set("k", "1").unwrap();
        assert_eq!(adapter.get("k").unwrap().as_deref(), Some("1"));
        adapter.remove("k").unwrap();
        assert_eq!(adapter.get("k").unwrap(), None);
        adapter.remove("k").unwrap();
        assert_eq!(adapter.write_count(), 1);
    }

    #[test]
    fn injected_faults() {
        let mut adapter = MemoryAdapter::new().fail_reads_of("a").fail_writes_of("b");
        assert!(adapter.get("a").is_err());
        assert!(adapter.set("b", "x").is_err());
        assert!(adapter.remove("b").is_err());
        assert!(adapter.set("a", "x").is_ok());
    }
}
