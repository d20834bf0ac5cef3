// Key layout shared with the backing store.
//
// These strings are the on-disk contract; changing any of them orphans
// existing data.

/// Namespace of record hashes: `swiftCode:<CODE>`
pub const RECORD_NAMESPACE: &str = "swiftCode:";

/// Namespace of country index sets: `idx:countryISO2:<CC>`
pub const COUNTRY_INDEX_NAMESPACE: &str = "idx:countryISO2:";

/// Namespace of branch group sets: `branch:<PREFIX>`
pub const BRANCH_GROUP_NAMESPACE: &str = "branch:";

/// Single hash mapping country code to display name
pub const COUNTRY_NAMES_KEY: &str = "countries";

/// Record key for an (already normalized) code
pub fn record_key(code: &str) -> String {
    format!("{RECORD_NAMESPACE}{code}")
}

/// Recover the bare code from a record key
pub fn code_from_record_key(key: &str) -> Option<&str> {
    key.strip_prefix(RECORD_NAMESPACE)
}

pub fn country_index_key(country_code: &str) -> String {
    format!("{COUNTRY_INDEX_NAMESPACE}{country_code}")
}

pub fn branch_group_key(prefix: &str) -> String {
    format!("{BRANCH_GROUP_NAMESPACE}{prefix}")
}
