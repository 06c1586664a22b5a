//! Domain records: the live company mirror, its history snapshots, and
//! the content fingerprint that decides whether a refresh changed anything.

pub mod company;
pub mod fingerprint;

pub use company::{Company, CompanyProfile, CompanySnapshot, SourceRecord, UsedName};
pub use fingerprint::FingerprintError;
