// 🔑 Institution Codes - the 8 + 3 character split
//
// A SWIFT/BIC code is an 8-character institution prefix followed by a
// 3-character location suffix. The suffix "XXX" marks the headquarters;
// every other suffix is a branch of the institution named by the prefix.

/// Total length of an institution code
pub const CODE_LEN: usize = 11;

/// Length of the institution prefix shared by a headquarters and its branches
pub const PREFIX_LEN: usize = 8;

/// Length of the location suffix
pub const SUFFIX_LEN: usize = 3;

/// Suffix that marks a headquarters record
pub const HEADQUARTERS_SUFFIX: &str = "XXX";

/// Length of a country code (ISO 3166-1 alpha-2)
pub const COUNTRY_CODE_LEN: usize = 2;

/// Upper-case a code so that every lookup addresses the same key.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Upper-case a country code.
pub fn normalize_country(country: &str) -> String {
    country.trim().to_ascii_uppercase()
}

/// Location suffix (last 3 characters), or `None` when the code is too short
/// to carry one.
pub fn location_suffix(code: &str) -> Option<&str> {
    let split = code.len().checked_sub(SUFFIX_LEN)?;
    code.get(split..)
}

/// Institution prefix: the code with its 3-character suffix stripped.
///
/// For a well-formed code this is the 8-character prefix. Codes shorter than
/// the suffix yield an empty prefix instead of panicking.
pub fn institution_prefix(code: &str) -> &str {
    code.len()
        .checked_sub(SUFFIX_LEN)
        .and_then(|split| code.get(..split))
        .unwrap_or("")
}

/// True iff the code ends in the headquarters suffix "XXX".
pub fn is_headquarter_suffix(code: &str) -> bool {
    location_suffix(code).is_some_and(|suffix| suffix.eq_ignore_ascii_case(HEADQUARTERS_SUFFIX))
}

/// Headquarters code for an institution prefix.
pub fn headquarters_code(prefix: &str) -> String {
    format!("{}{}", normalize_code(prefix), HEADQUARTERS_SUFFIX)
}

/// Structural check used on every write path: exactly 11 ASCII alphanumerics.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Structural check for a group prefix: exactly 8 ASCII alphanumerics.
pub fn is_well_formed_prefix(prefix: &str) -> bool {
    prefix.len() == PREFIX_LEN && prefix.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_suffix_split() {
        assert_eq!(institution_prefix("BCHICLRMXXX"), "BCHICLRM");
        assert_eq!(institution_prefix("BCHICLRM001"), "BCHICLRM");
        assert_eq!(location_suffix("BCHICLRM001"), Some("001"));
    }

    #[test]
    fn test_headquarters_detection() {
        assert!(is_headquarter_suffix("AAISALTRXXX"));
        assert!(is_headquarter_suffix("aaisaltrxxx"));
        assert!(!is_headquarter_suffix("BCHICLR10R3"));
        // "XXX" inside the prefix does not count
        assert!(!is_headquarter_suffix("XXXXCLRM001"));
    }

    #[test]
    fn test_short_codes_do_not_panic() {
        assert_eq!(institution_prefix("AB"), "");
        assert_eq!(location_suffix("AB"), None);
        assert!(!is_headquarter_suffix(""));
        assert_eq!(institution_prefix("XXX"), "");
        assert!(is_headquarter_suffix("XXX"));
    }

    #[test]
    fn test_headquarters_code() {
        assert_eq!(headquarters_code("bchiclrm"), "BCHICLRMXXX");
    }

    #[test]
    fn test_well_formed_code() {
        assert!(is_well_formed_code("BCHICLRMXXX"));
        assert!(!is_well_formed_code("BCHICLRMXX"));
        assert!(!is_well_formed_code("BCHI-LRMXXX"));
        assert!(is_well_formed_prefix("BCHICLRM"));
        assert!(!is_well_formed_prefix("BCHICLR"));
    }
}
