// Entity Models
//
// The directory stores a single entity kind: a bank (headquarters or branch)
// addressed by its institution code.

pub mod bank;

pub use bank::BankRecord;
