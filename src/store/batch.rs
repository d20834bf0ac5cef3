// 📦 Batch - an ordered list of mutations applied all-or-nothing
//
// Every write path in the directory stages its table and index changes into
// one Batch and hands it to `KeyValueStore::apply`.

use super::FieldMap;

/// One primitive change against the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Write fields into the hash at `key` (existing fields not named are kept)
    HashSet { key: String, fields: FieldMap },

    /// Add `member` to the set at `key`
    SetAdd { key: String, member: String },

    /// Remove `member` from the set at `key`; an emptied set stops existing
    SetRemove { key: String, member: String },

    /// Drop `key` whatever it holds
    Delete { key: String },
}

impl Mutation {
    pub fn key(&self) -> &str {
        match self {
            Mutation::HashSet { key, .. }
            | Mutation::SetAdd { key, .. }
            | Mutation::SetRemove { key, .. }
            | Mutation::Delete { key } => key,
        }
    }
}

/// Ordered mutations; later entries observe the effects of earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    mutations: Vec<Mutation>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_set(&mut self, key: impl Into<String>, fields: FieldMap) -> &mut Self {
        self.mutations.push(Mutation::HashSet {
            key: key.into(),
            fields,
        });
        self
    }

    pub fn hash_set_field(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let mut fields = FieldMap::new();
        fields.insert(field.into(), value.into());
        self.hash_set(key, fields)
    }

    pub fn set_add(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.mutations.push(Mutation::SetAdd {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    pub fn set_remove(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.mutations.push(Mutation::SetRemove {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.mutations.push(Mutation::Delete { key: key.into() });
        self
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

impl IntoIterator for Batch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}
