// ⚠️ Error Taxonomy
//
// ValidationError  - malformed input, rejected before any mutation
// StorageError     - the backing store failed (connectivity, wrong type, bad data)
// DirectoryError   - what the directory service hands back to its callers

use thiserror::Error;

/// Malformed input, named by the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}


/// Failure inside a backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("key {key} holds a value of the wrong type (expected {expected})")]
    WrongType { key: String, expected: &'static str },

    #[error("malformed data at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors returned by the directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("no record for institution code {0}")]
    NotFound(String),

    #[error("{op} failed for {key}: {source}")]
    Storage {
        op: &'static str,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("cascade delete left {0} in place")]
    CascadeConsistency(String),
}

impl DirectoryError {
    /// Client-side problem (bad input or unknown record) rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DirectoryError::Validation(_) | DirectoryError::NotFound(_))
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Attach operation name and key to a storage failure.
pub trait StorageContext<T> {
    fn during(self, op: &'static str, key: &str) -> DirectoryResult<T>;
}

impl<T> StorageContext<T> for Result<T, StorageError> {
    fn during(self, op: &'static str, key: &str) -> DirectoryResult<T> {
        self.map_err(|source| DirectoryError::Storage {
            op,
            key: key.to_string(),
            source,
        })
    }
}
