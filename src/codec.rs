// 🔁 Record Codec - BankRecord <-> flat field map
//
// All rules about which fields are written, which may be omitted and how the
// headquarters flag is handled live here and nowhere else.

use crate::entities::BankRecord;
use crate::error::StorageError;
use crate::store::FieldMap;

// ============================================================================
// FIELD NAMES
// ============================================================================

pub const FIELD_CODE: &str = "swiftCode";
pub const FIELD_COUNTRY_CODE: &str = "countryISO2";
pub const FIELD_NAME: &str = "bankName";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_TOWN: &str = "town";
pub const FIELD_COUNTRY_NAME: &str = "countryName";
pub const FIELD_TIMEZONE: &str = "timezone";
/// Written for readers of the raw store; ignored on decode.
pub const FIELD_HEADQUARTERS: &str = "isHeadquater";

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Flatten a record into its stored field map.
///
/// Required fields and the headquarters flag are always present; absent
/// optional fields are omitted entirely.
pub fn encode(record: &BankRecord) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(FIELD_CODE.to_string(), record.code.clone());
    fields.insert(FIELD_COUNTRY_CODE.to_string(), record.country_code.clone());
    fields.insert(FIELD_NAME.to_string(), record.name.clone());
    fields.insert(
        FIELD_HEADQUARTERS.to_string(),
        if record.is_headquarters() { "1" } else { "0" }.to_string(),
    );

    let optional = [
        (FIELD_TYPE, &record.record_type),
        (FIELD_ADDRESS, &record.address),
        (FIELD_TOWN, &record.town),
        (FIELD_COUNTRY_NAME, &record.country_name),
        (FIELD_TIMEZONE, &record.timezone),
    ];
    for (field, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            fields.insert(field.to_string(), value.to_string());
        }
    }

    fields
}

/// Rebuild a record from the field map stored at `key`.
pub fn decode(key: &str, mut fields: FieldMap) -> Result<BankRecord, StorageError> {
    let mut required = |field: &str| {
        fields
            .remove(field)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StorageError::Corrupt {
                key: key.to_string(),
                reason: format!("missing field '{field}'"),
            })
    };

    let code = required(FIELD_CODE)?;
    let country_code = required(FIELD_COUNTRY_CODE)?;
    let name = required(FIELD_NAME)?;

    let mut optional = |field: &str| fields.remove(field).filter(|v| !v.is_empty());

    Ok(BankRecord {
        code,
        country_code,
        name,
        address: optional(FIELD_ADDRESS),
        town: optional(FIELD_TOWN),
        country_name: optional(FIELD_COUNTRY_NAME),
        timezone: optional(FIELD_TIMEZONE),
        record_type: optional(FIELD_TYPE),
    })
}
