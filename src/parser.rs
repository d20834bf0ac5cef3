// 📂 CSV Import - the published SWIFT code spreadsheet -> BankRecords
//
// Columns are located by header name, so column order in the file does not
// matter. Every required header must be present.

use crate::directory::DirectoryService;
use crate::entities::BankRecord;
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

// ============================================================================
// COLUMNS
// ============================================================================

pub const COL_COUNTRY_CODE: &str = "COUNTRY ISO2 CODE";
pub const COL_SWIFT_CODE: &str = "SWIFT CODE";
pub const COL_CODE_TYPE: &str = "CODE TYPE";
pub const COL_NAME: &str = "NAME";
pub const COL_ADDRESS: &str = "ADDRESS";
pub const COL_TOWN: &str = "TOWN NAME";
pub const COL_COUNTRY_NAME: &str = "COUNTRY NAME";
pub const COL_TIMEZONE: &str = "TIME ZONE";

/// Position of every column the importer reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    country_code: usize,
    swift_code: usize,
    code_type: usize,
    name: usize,
    address: usize,
    town: usize,
    country_name: usize,
    timezone: usize,
}

impl ColumnMap {
    /// Locate the required columns in a header row.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| anyhow!("{} column not found in CSV", column))
        };

        Ok(ColumnMap {
            country_code: find(COL_COUNTRY_CODE)?,
            swift_code: find(COL_SWIFT_CODE)?,
            code_type: find(COL_CODE_TYPE)?,
            name: find(COL_NAME)?,
            address: find(COL_ADDRESS)?,
            town: find(COL_TOWN)?,
            country_name: find(COL_COUNTRY_NAME)?,
            timezone: find(COL_TIMEZONE)?,
        })
    }

    fn to_record(self, row: &StringRecord) -> BankRecord {
        let cell = |idx: usize| row.get(idx).unwrap_or("").to_string();
        let optional = |idx: usize| row.get(idx).filter(|v| !v.is_empty()).map(str::to_string);

        BankRecord {
            code: cell(self.swift_code),
            country_code: cell(self.country_code),
            name: cell(self.name),
            address: optional(self.address),
            town: optional(self.town),
            country_name: optional(self.country_name),
            timezone: optional(self.timezone),
            record_type: optional(self.code_type),
        }
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse a SWIFT code CSV file.
pub fn parse_csv(path: &Path) -> Result<Vec<BankRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.csv");

    let records = parse_reader(file, source)?;
    info!(file = %path.display(), records = records.len(), "parsed SWIFT code CSV");
    Ok(records)
}

/// Parse CSV content from any reader; `source` names it in error messages.
pub fn parse_reader<R: Read>(reader: R, source: &str) -> Result<Vec<BankRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header in {}", source))?
        .clone();
    let columns = ColumnMap::from_headers(&headers).with_context(|| format!("Invalid header in {}", source))?;

    let mut records = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let row = result.with_context(|| {
            // +2 because: 1-indexed + header row
            format!("Failed to parse CSV line {} in {}", line_num + 2, source)
        })?;
        records.push(columns.to_record(&row));
    }

    Ok(records)
}

// ============================================================================
// IMPORT
// ============================================================================

/// Parse `path` and write every row through `bulk_create`: the file lands
/// as one batch or not at all.
pub fn import_csv(service: &DirectoryService, path: &Path) -> Result<usize> {
    let records = parse_csv(path)?;
    let imported = service
        .bulk_create(records)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    info!(file = %path.display(), records = imported, "imported SWIFT codes");
    Ok(imported)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE
AL,AAISALTRXXX,BIC11,UNITED BANK OF ALBANIA SH.A,\"HYRJA 3 RR. DRITAN HOXHA ND. 11 TIRANA, TIRANA, 1023\",TIRANA,ALBANIA,Europe/Tirane
CL,BCHICLR10R3,BIC11,BANCO DE CHILE,  ,ARICA,CHILE,Pacific/Easter
";

    #[test]
    fn test_parse_reader_maps_columns() {
        let records = parse_reader(SAMPLE.as_bytes(), "sample.csv").unwrap();
        assert_eq!(records.len(), 2);

        let albania = &records[0];
        assert_eq!(albania.code, "AAISALTRXXX");
        assert_eq!(albania.country_code, "AL");
        assert_eq!(albania.name, "UNITED BANK OF ALBANIA SH.A");
        assert_eq!(
            albania.address.as_deref(),
            Some("HYRJA 3 RR. DRITAN HOXHA ND. 11 TIRANA, TIRANA, 1023")
        );
        assert_eq!(albania.record_type.as_deref(), Some("BIC11"));
        assert_eq!(albania.timezone.as_deref(), Some("Europe/Tirane"));

        // Blank cells become absent fields
        assert_eq!(records[1].address, None);
        assert_eq!(records[1].town.as_deref(), Some("ARICA"));
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "\
NAME,TIME ZONE,SWIFT CODE,COUNTRY NAME,TOWN NAME,ADDRESS,CODE TYPE,COUNTRY ISO2 CODE
BANK JULIUS BAER (MONACO) S.A.M.,Europe/Monaco,BAERMCMCXXX,MONACO,MONACO,12 BOULEVARD DES MOULINS,BIC11,MC
";
        let records = parse_reader(csv.as_bytes(), "reordered.csv").unwrap();
        assert_eq!(records[0].code, "BAERMCMCXXX");
        assert_eq!(records[0].country_code, "MC");
        assert_eq!(records[0].country_name.as_deref(), Some("MONACO"));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let csv = "COUNTRY ISO2 CODE,SWIFT CODE,NAME\nAL,AAISALTRXXX,BANK\n";
        let err = parse_reader(csv.as_bytes(), "broken.csv").unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("CODE TYPE column not found"), "{}", chain);
    }

    #[test]
    fn test_ragged_row_reports_line_number() {
        let csv = format!("{}AL,AAISALTRXXX\n", SAMPLE);
        let err = parse_reader(csv.as_bytes(), "ragged.csv").unwrap_err();
        assert!(err.to_string().contains("line 4"), "{}", err);
    }

    #[test]
    fn test_parse_csv_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let records = parse_csv(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_import_csv_into_directory() {
        use crate::store::MemoryStore;
        use std::sync::Arc;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let service = DirectoryService::new(Arc::new(MemoryStore::new()));
        assert_eq!(import_csv(&service, file.path()).unwrap(), 2);

        assert_eq!(service.get("AAISALTRXXX").unwrap().town.as_deref(), Some("TIRANA"));
        assert_eq!(service.country_name("CL").unwrap(), "CHILE");
    }

    #[test]
    fn test_import_rejects_whole_file_on_bad_row() {
        use crate::store::MemoryStore;
        use std::sync::Arc;

        let csv = format!("{}CL,SHORT,BIC11,BANCO,,ARICA,CHILE,Pacific/Easter\n", SAMPLE);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let store = Arc::new(MemoryStore::new());
        let service = DirectoryService::new(store.clone());
        assert!(import_csv(&service, file.path()).is_err());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_parse_csv_missing_file() {
        let err = parse_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
