// Branch Group Index - headquarters prefix -> branch codes
//
// One set per institution at `branch:<PREFIX>`, holding bare branch codes.
// A headquarters is found by exact key and is never a member of its own group.

use crate::code::{institution_prefix, is_headquarter_suffix, normalize_code};
use crate::error::StorageError;
use crate::keys::branch_group_key;
use crate::store::{Batch, KeyValueStore};
use std::collections::BTreeSet;

pub struct BranchGroupIndex<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> BranchGroupIndex<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        BranchGroupIndex { store }
    }

    /// Stage `code` into the group of its own prefix.
    ///
    /// Headquarters codes are skipped; returns whether anything was staged.
    pub fn add(&self, batch: &mut Batch, code: &str) -> bool {
        let code = normalize_code(code);
        if is_headquarter_suffix(&code) {
            return false;
        }
        batch.set_add(branch_group_key(institution_prefix(&code)), code);
        true
    }

    /// Stage deletion of the whole group
    pub fn remove_group(&self, batch: &mut Batch, prefix: &str) {
        batch.delete(branch_group_key(&normalize_code(prefix)));
    }

    pub fn members(&self, prefix: &str) -> Result<BTreeSet<String>, StorageError> {
        self.store.set_members(&branch_group_key(&normalize_code(prefix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_branches_grouped_by_prefix() {
        let store = MemoryStore::new();
        let index = BranchGroupIndex::new(&store);

        let mut batch = Batch::new();
        assert!(index.add(&mut batch, "BCHICLRM001"));
        assert!(index.add(&mut batch, "bchiclrm002"));
        assert!(index.add(&mut batch, "BCHICLR10R3"));
        store.apply(batch).unwrap();

        let members = index.members("BCHICLRM").unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains("BCHICLRM002"));
        assert_eq!(index.members("BCHICLR1").unwrap().len(), 1);
    }

    #[test]
    fn test_headquarters_never_joins_its_group() {
        let store = MemoryStore::new();
        let index = BranchGroupIndex::new(&store);

        let mut batch = Batch::new();
        assert!(!index.add(&mut batch, "BCHICLRMXXX"));
        assert!(batch.is_empty());
    }

    #[test]
    fn test_remove_group() {
        let store = MemoryStore::new();
        let index = BranchGroupIndex::new(&store);

        let mut batch = Batch::new();
        index.add(&mut batch, "BCHICLRM001");
        store.apply(batch).unwrap();

        let mut batch = Batch::new();
        index.remove_group(&mut batch, "bchiclrm");
        store.apply(batch).unwrap();

        assert!(index.members("BCHICLRM").unwrap().is_empty());
        assert!(!store.exists("branch:BCHICLRM").unwrap());
    }
}
