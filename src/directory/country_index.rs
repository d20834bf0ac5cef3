// Country Index - "which banks are in country X"
//
// One set per country at `idx:countryISO2:<CC>`. Members are record keys
// (`swiftCode:<CODE>`), not bare codes; callers only ever see bare codes.

use crate::code::{normalize_code, normalize_country};
use crate::error::StorageError;
use crate::keys::{code_from_record_key, country_index_key, record_key};
use crate::store::{Batch, KeyValueStore};
use std::collections::BTreeSet;
use tracing::warn;

pub struct CountryIndex<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> CountryIndex<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        CountryIndex { store }
    }

    /// Stage membership of `code` in `country`. Adding twice is harmless.
    pub fn add(&self, batch: &mut Batch, country: &str, code: &str) {
        batch.set_add(
            country_index_key(&normalize_country(country)),
            record_key(&normalize_code(code)),
        );
    }

    pub fn remove(&self, batch: &mut Batch, country: &str, code: &str) {
        batch.set_remove(
            country_index_key(&normalize_country(country)),
            record_key(&normalize_code(code)),
        );
    }

    /// Bare codes indexed under `country`; empty for a country never seen.
    pub fn members(&self, country: &str) -> Result<BTreeSet<String>, StorageError> {
        let key = country_index_key(&normalize_country(country));
        let members = self.store.set_members(&key)?;

        Ok(members
            .iter()
            .filter_map(|member| match code_from_record_key(member) {
                Some(code) => Some(code.to_string()),
                None => {
                    warn!(index = %key, member = %member, "country index member is not a record key");
                    None
                }
            })
            .collect())
    }
}
