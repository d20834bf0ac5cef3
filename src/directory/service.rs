// 🏛️ Directory Service - the operations the rest of the system calls
//
// Owns the backing store handle and composes the record table, both indexes
// and the country name table. Every write is exactly one atomic batch.

use super::{BranchGroupIndex, CountryIndex, CountryNameTable, RecordTable};
use crate::code::{
    headquarters_code, institution_prefix, is_headquarter_suffix, normalize_code, normalize_country,
};
use crate::entities::BankRecord;
use crate::error::{DirectoryError, DirectoryResult, StorageContext};
use crate::keys::record_key;
use crate::store::{Batch, KeyValueStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// A record plus, for a headquarters, the branches sharing its prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankWithBranches {
    pub record: BankRecord,
    /// Always empty for a branch record
    pub branches: Vec<BankRecord>,
}

/// Everything the directory knows about one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryListing {
    pub country_code: String,
    /// Empty when the country was never written
    pub country_name: String,
    pub records: Vec<BankRecord>,
}

/// What a group delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupDeletion {
    pub headquarters_removed: bool,
    pub branches_removed: usize,
}

impl GroupDeletion {
    pub fn is_noop(&self) -> bool {
        !self.headquarters_removed && self.branches_removed == 0
    }
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn KeyValueStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        DirectoryService { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn records(&self) -> RecordTable<'_> {
        RecordTable::new(self.store.as_ref())
    }

    fn countries(&self) -> CountryIndex<'_> {
        CountryIndex::new(self.store.as_ref())
    }

    fn branches(&self) -> BranchGroupIndex<'_> {
        BranchGroupIndex::new(self.store.as_ref())
    }

    fn country_names(&self) -> CountryNameTable<'_> {
        CountryNameTable::new(self.store.as_ref())
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Stage one already validated and normalized record.
    ///
    /// `staged` maps codes already written earlier in the same batch to their
    /// country; it takes precedence over what the store holds.
    fn stage_create(
        &self,
        batch: &mut Batch,
        record: &BankRecord,
        staged: &mut HashMap<String, String>,
    ) -> DirectoryResult<()> {
        // An overwrite that moves a record to another country must not leave
        // it listed under the old one
        let prior_country = match staged.get(&record.code) {
            Some(country) => Some(country.clone()),
            None => self
                .records()
                .get(&record.code)
                .during("create", &record_key(&record.code))?
                .map(|prior| prior.country_code),
        };
        if let Some(prior_country) = prior_country.filter(|c| *c != record.country_code) {
            self.countries().remove(batch, &prior_country, &record.code);
        }

        self.records().put(batch, record);
        self.countries().add(batch, &record.country_code, &record.code);
        self.branches().add(batch, &record.code);
        if let Some(country_name) = &record.country_name {
            self.country_names().set(batch, &record.country_code, country_name);
        }
        staged.insert(record.code.clone(), record.country_code.clone());
        Ok(())
    }

    /// Add or overwrite one record together with its index entries.
    pub fn create(&self, record: BankRecord) -> DirectoryResult<()> {
        record.validate()?;
        let record = record.normalized();

        let mut batch = Batch::new();
        self.stage_create(&mut batch, &record, &mut HashMap::new())?;
        self.store.apply(batch).during("create", &record_key(&record.code))?;

        info!(code = %record.code, country = %record.country_code, "created record");
        Ok(())
    }

    /// Import many records as a single batch: all land or none do.
    ///
    /// Every record is validated before anything is staged; the first
    /// invalid one rejects the whole import.
    pub fn bulk_create(&self, records: Vec<BankRecord>) -> DirectoryResult<usize> {
        for record in &records {
            record.validate().map_err(|mut err| {
                err.message = format!("{} (record {})", err.message, record.code);
                err
            })?;
        }

        let count = records.len();
        let mut batch = Batch::new();
        let mut staged = HashMap::new();
        for record in records {
            self.stage_create(&mut batch, &record.normalized(), &mut staged)?;
        }

        debug!(records = count, mutations = batch.len(), "applying bulk import");
        self.store.apply(batch).during("bulk_create", "import batch")?;

        info!(records = count, "bulk import complete");
        Ok(count)
    }

    /// Remove exactly one record and its country index entry.
    ///
    /// The branch group is left alone, even for a headquarters code; use
    /// [`DirectoryService::delete_group`] for the cascading variant. Returns
    /// whether a record existed.
    pub fn delete_one(&self, code: &str) -> DirectoryResult<bool> {
        let code = normalize_code(code);
        let key = record_key(&code);

        let mut batch = Batch::new();
        let Some(prior) = self.records().delete(&mut batch, &code).during("delete_one", &key)? else {
            debug!(code = %code, "delete of absent record");
            return Ok(false);
        };
        self.countries().remove(&mut batch, &prior.country_code, &code);

        self.store.apply(batch).during("delete_one", &key)?;
        info!(code = %code, "deleted record");
        Ok(true)
    }

    /// Cascade delete: the headquarters at `prefix + "XXX"`, every branch in
    /// the prefix's group, their country index entries and the group itself,
    /// all in one batch.
    pub fn delete_group(&self, prefix: &str) -> DirectoryResult<GroupDeletion> {
        let prefix = normalize_code(prefix);
        let hq_code = headquarters_code(&prefix);
        let hq_key = record_key(&hq_code);

        let mut batch = Batch::new();
        let mut summary = GroupDeletion::default();

        // 1. Headquarters
        if let Some(hq) = self.records().delete(&mut batch, &hq_code).during("delete_group", &hq_key)? {
            self.countries().remove(&mut batch, &hq.country_code, &hq_code);
            summary.headquarters_removed = true;
        }

        // 2. Branches
        let members = self.branches().members(&prefix).during("delete_group", &prefix)?;
        for branch_code in &members {
            let branch_key = record_key(branch_code);
            let prior = self.records().get(branch_code).during("delete_group", &branch_key)?;
            if let Some(branch) = prior {
                self.countries().remove(&mut batch, &branch.country_code, branch_code);
            }
            batch.delete(branch_key);
            summary.branches_removed += 1;
        }

        if summary.is_noop() {
            debug!(prefix = %prefix, "group delete matched nothing");
            return Ok(summary);
        }

        // 3. The group itself
        self.branches().remove_group(&mut batch, &prefix);

        // 4. One batch
        self.store.apply(batch).during("delete_group", &prefix)?;

        // 5. Verify the headquarters is really gone
        if self.store.exists(&hq_key).during("delete_group", &hq_key)? {
            return Err(DirectoryError::CascadeConsistency(hq_key));
        }

        info!(
            prefix = %prefix,
            headquarters = summary.headquarters_removed,
            branches = summary.branches_removed,
            "deleted institution group"
        );
        Ok(summary)
    }

    /// Delete by code the way the HTTP API does: a headquarters takes its
    /// whole group with it, anything else is removed on its own.
    pub fn remove(&self, code: &str) -> DirectoryResult<()> {
        let code = normalize_code(code);
        if is_headquarter_suffix(&code) {
            self.delete_group(institution_prefix(&code))?;
        } else {
            self.delete_one(&code)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// One record, `NotFound` when absent.
    pub fn get(&self, code: &str) -> DirectoryResult<BankRecord> {
        let code = normalize_code(code);
        self.records()
            .get(&code)
            .during("get", &record_key(&code))?
            .ok_or(DirectoryError::NotFound(code))
    }

    /// One record and, for a headquarters, its branches.
    ///
    /// Branch lookups that fail are logged and left out: the headquarters is
    /// still returned.
    pub fn get_with_branches(&self, code: &str) -> DirectoryResult<BankWithBranches> {
        let record = self.get(code)?;
        let branches = if record.is_headquarters() {
            self.resolve_branches(record.institution_prefix())
        } else {
            Vec::new()
        };
        Ok(BankWithBranches { record, branches })
    }

    fn resolve_branches(&self, prefix: &str) -> Vec<BankRecord> {
        let members = match self.branches().members(prefix) {
            Ok(members) => members,
            Err(err) => {
                warn!(prefix = %prefix, error = %err, "could not read branch group");
                return Vec::new();
            }
        };

        let mut branches = Vec::with_capacity(members.len());
        for branch_code in &members {
            match self.records().get(branch_code) {
                Ok(Some(branch)) => branches.push(branch),
                Ok(None) => debug!(code = %branch_code, "branch group points at a missing record"),
                Err(err) => warn!(code = %branch_code, error = %err, "could not read branch record"),
            }
        }
        branches
    }

    /// All records of a country plus its display name.
    ///
    /// An unknown country is an empty listing, not an error.
    pub fn list_by_country(&self, country: &str) -> DirectoryResult<CountryListing> {
        let country_code = normalize_country(country);
        let country_name = self.country_name(&country_code)?;

        let members = self
            .countries()
            .members(&country_code)
            .during("list_by_country", &country_code)?;

        let mut records = Vec::with_capacity(members.len());
        for member in &members {
            match self.records().get(member).during("list_by_country", &record_key(member))? {
                Some(record) => records.push(record),
                None => debug!(code = %member, country = %country_code, "country index points at a missing record"),
            }
        }

        Ok(CountryListing {
            country_code,
            country_name,
            records,
        })
    }

    /// Display name for a country code, empty when unknown.
    pub fn country_name(&self, country: &str) -> DirectoryResult<String> {
        let country_code = normalize_country(country);
        self.country_names()
            .get(&country_code)
            .during("country_name", &country_code)
    }
}

// ============================================================================
// TESTS
// ============================================================================
