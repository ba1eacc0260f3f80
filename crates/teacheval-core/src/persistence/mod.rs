//! Key-value persistence adapters.
//!
//! The record store reads and writes each collection as one serialized
//! value under a fixed logical key. Adapters report failures as
//! [`StorageError`]; the store absorbs them.

mod file;
mod memory;

pub use file::FileAdapter;
pub use memory::MemoryAdapter;

use std::fmt;

use crate::error::StorageError;

/// Backend for serialized values.
pub trait PersistenceAdapter {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<A: PersistenceAdapter + ?Sized> PersistenceAdapter for Box<A> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Logical keys of the persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Users,
    Colleges,
    Courses,
    Evaluations,
    Observations,
    Config,
    CurrentUser,
    Token,
    Notices,
}

impl StorageKey {
    pub const ALL: [StorageKey; 9] = [
        StorageKey::Users,
        StorageKey::Colleges,
        StorageKey::Courses,
        StorageKey::Evaluations,
        StorageKey::Observations,
        StorageKey::Config,
        StorageKey::CurrentUser,
        StorageKey::Token,
        StorageKey::Notices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Users => "users",
            StorageKey::Colleges => "colleges",
            StorageKey::Courses => "courses",
            StorageKey::Evaluations => "evaluations",
            StorageKey::Observations => "listenRecords",
            StorageKey::Config => "config",
            StorageKey::CurrentUser => "currentUser",
            StorageKey::Token => "token",
            StorageKey::Notices => "notices",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
