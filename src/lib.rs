// SWIFT Directory - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod code;       // Code shapes: prefix, suffix, headquarters
pub mod codec;      // BankRecord <-> stored hash fields
pub mod config;
pub mod directory;  // Tables, indexes and the directory service
pub mod entities;
pub mod error;
pub mod keys;       // Store key layout
pub mod logging;
pub mod parser;     // CSV import
pub mod store;      // Backing key-value stores

#[cfg(feature = "server")]
pub mod api;        // HTTP surface

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use directory::{BankWithBranches, CountryListing, DirectoryService, GroupDeletion};
pub use entities::BankRecord;
pub use error::{DirectoryError, DirectoryResult, StorageError, ValidationError};
pub use parser::{parse_csv, parse_reader};
pub use store::{Batch, KeyValueStore, MemoryStore, Mutation, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
