// Country Name Table - country code -> display name, last write wins

use crate::code::normalize_country;
use crate::error::StorageError;
use crate::keys::COUNTRY_NAMES_KEY;
use crate::store::{Batch, KeyValueStore};

pub struct CountryNameTable<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> CountryNameTable<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        CountryNameTable { store }
    }

    pub fn set(&self, batch: &mut Batch, country: &str, name: &str) {
        batch.hash_set_field(COUNTRY_NAMES_KEY, normalize_country(country), name);
    }

    /// Display name, or an empty string for a code never written.
    ///
    /// "Unknown country" and "country without banks" look the same here.
    pub fn get(&self, country: &str) -> Result<String, StorageError> {
        Ok(self
            .store
            .hash_get(COUNTRY_NAMES_KEY, &normalize_country(country))?
            .unwrap_or_default())
    }
}
