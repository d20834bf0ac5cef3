// Directory - typed tables and indexes over the backing store, plus the
// service that keeps them consistent.

pub mod branch_index;
pub mod country_index;
pub mod country_names;
pub mod records;
pub mod service;

pub use branch_index::BranchGroupIndex;
pub use country_index::CountryIndex;
pub use country_names::CountryNameTable;
pub use records::RecordTable;
pub use service::{BankWithBranches, CountryListing, DirectoryService, GroupDeletion};
