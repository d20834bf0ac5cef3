// In-memory store - Redis semantics without the server
//
// Batches stage their effects on copies of the touched keys and only publish
// them once every mutation has succeeded.

use super::{Batch, FieldMap, KeyValueStore, Mutation, ValueKind};
use crate::error::StorageError;
use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Hash(FieldMap),
    Set(BTreeSet<String>),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every key currently present, sorted
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let data = self.read()?;
        let mut keys: Vec<String> = data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Value>>, StorageError> {
        self.data.read().map_err(|_| StorageError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Value>>, StorageError> {
        self.data.write().map_err(|_| StorageError::Poisoned)
    }
}

fn wrong_type(key: &str, expected: ValueKind) -> StorageError {
    StorageError::WrongType {
        key: key.to_string(),
        expected: expected.as_str(),
    }
}

/// Next state of one key after `mutation`; `None` means the key is gone.
fn apply_one(key: &str, current: Option<Value>, mutation: Mutation) -> Result<Option<Value>, StorageError> {
    match mutation {
        Mutation::HashSet { fields, .. } => {
            let mut hash = match current {
                None => FieldMap::new(),
                Some(Value::Hash(hash)) => hash,
                Some(Value::Set(_)) => return Err(wrong_type(key, ValueKind::Hash)),
            };
            hash.extend(fields);
            Ok((!hash.is_empty()).then_some(Value::Hash(hash)))
        }
        Mutation::SetAdd { member, .. } => {
            let mut set = match current {
                None => BTreeSet::new(),
                Some(Value::Set(set)) => set,
                Some(Value::Hash(_)) => return Err(wrong_type(key, ValueKind::Set)),
            };
            set.insert(member);
            Ok(Some(Value::Set(set)))
        }
        Mutation::SetRemove { member, .. } => match current {
            None => Ok(None),
            Some(Value::Set(mut set)) => {
                set.remove(&member);
                Ok((!set.is_empty()).then_some(Value::Set(set)))
            }
            Some(Value::Hash(_)) => Err(wrong_type(key, ValueKind::Set)),
        },
        Mutation::Delete { .. } => Ok(None),
    }
}

impl KeyValueStore for MemoryStore {
    fn hash_get_all(&self, key: &str) -> Result<Option<FieldMap>, StorageError> {
        match self.read()?.get(key) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(Some(hash.clone())),
            Some(Value::Set(_)) => Err(wrong_type(key, ValueKind::Hash)),
        }
    }

    fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StorageError> {
        match self.read()?.get(key) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(Value::Set(_)) => Err(wrong_type(key, ValueKind::Hash)),
        }
    }

    fn set_members(&self, key: &str) -> Result<BTreeSet<String>, StorageError> {
        match self.read()?.get(key) {
            None => Ok(BTreeSet::new()),
            Some(Value::Set(set)) => Ok(set.clone()),
            Some(Value::Hash(_)) => Err(wrong_type(key, ValueKind::Set)),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.read()?.contains_key(key))
    }

    fn apply(&self, batch: Batch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut data = self.write()?;
        let mut staged: HashMap<String, Option<Value>> = HashMap::new();

        for mutation in batch {
            let key = mutation.key().to_string();
            let current = match staged.remove(&key) {
                Some(value) => value,
                None => data.get(&key).cloned(),
            };
            // An error here drops `staged`; nothing has touched `data` yet
            let next = apply_one(&key, current, mutation)?;
            staged.insert(key, next);
        }

        for (key, value) in staged {
            match value {
                Some(value) => {
                    data.insert(key, value);
                }
                None => {
                    data.remove(&key);
                }
            }
        }

        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.write()?.clear();
        Ok(())
    }
}
