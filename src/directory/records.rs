// Record Table - the single source of truth, one hash per institution code

use crate::code::normalize_code;
use crate::codec;
use crate::entities::BankRecord;
use crate::error::StorageError;
use crate::keys::record_key;
use crate::store::{Batch, KeyValueStore};

/// Typed view over the `swiftCode:<CODE>` hashes.
///
/// Reads go straight to the store; writes are staged into a caller-owned
/// [`Batch`] so they land together with the matching index changes.
pub struct RecordTable<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> RecordTable<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        RecordTable { store }
    }

    /// Record at `code` (any case), `None` when absent.
    pub fn get(&self, code: &str) -> Result<Option<BankRecord>, StorageError> {
        let key = record_key(&normalize_code(code));
        match self.store.hash_get_all(&key)? {
            Some(fields) => codec::decode(&key, fields).map(Some),
            None => Ok(None),
        }
    }

    pub fn exists(&self, code: &str) -> Result<bool, StorageError> {
        self.store.exists(&record_key(&normalize_code(code)))
    }

    /// Stage a full replacement of the record at `record.code`.
    ///
    /// The old hash is dropped first so optional fields missing from the new
    /// record do not survive the overwrite.
    pub fn put(&self, batch: &mut Batch, record: &BankRecord) {
        let key = record_key(&normalize_code(&record.code));
        batch.delete(key.clone()).hash_set(key, codec::encode(record));
    }

    /// Stage removal of `code` and return the record as it was, if any.
    ///
    /// Deleting an absent code stages nothing and is not an error.
    pub fn delete(&self, batch: &mut Batch, code: &str) -> Result<Option<BankRecord>, StorageError> {
        let prior = self.get(code)?;
        if prior.is_some() {
            batch.delete(record_key(&normalize_code(code)));
        }
        Ok(prior)
    }
}
