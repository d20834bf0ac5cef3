// 🗄️ Backing Store - hash + set key/value primitives with atomic batches
//
// The directory only needs what a Redis-style store offers: hashes (field
// maps), sets, key existence and a transactional pipeline. Two backends:
//
// - SqliteStore: durable, one rusqlite transaction per batch
// - MemoryStore: in-process, for tests and throwaway runs

pub mod batch;
pub mod memory;
pub mod sqlite;

pub use batch::{Batch, Mutation};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StorageError;
use std::collections::{BTreeMap, BTreeSet};

/// Field name -> value, as stored in one hash
pub type FieldMap = BTreeMap<String, String>;

/// What a key currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Hash,
    Set,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Hash => "hash",
            ValueKind::Set => "set",
        }
    }
}

/// Synchronous key/value store shared by every caller of the directory.
///
/// Reads never fail for absent keys: a missing hash is `None`, a missing set
/// is empty. `apply` is the batch executor: either every mutation becomes
/// visible or none does.
pub trait KeyValueStore: Send + Sync {
    /// All fields of the hash at `key`, `None` when the key does not exist
    fn hash_get_all(&self, key: &str) -> Result<Option<FieldMap>, StorageError>;

    /// One field of the hash at `key`
    fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StorageError>;

    /// Members of the set at `key` (empty when absent)
    fn set_members(&self, key: &str) -> Result<BTreeSet<String>, StorageError>;

    /// Does `key` hold anything
    fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Apply a batch atomically
    fn apply(&self, batch: Batch) -> Result<(), StorageError>;

    /// Drop every key
    fn flush(&self) -> Result<(), StorageError>;
}
