//! Record store — the persistence port for the company mirror.
//!
//! The trait exposes the named operations the reconcile workflow needs
//! (lookups, create, touch, delete, snapshot, used-name mapping) plus two
//! transactional composites for the multi-step write sequences. Adapters
//! backed by a transactional engine override the composites to run them
//! atomically; the provided defaults just sequence the fine-grained calls,
//! which is enough for in-memory test stores.

pub mod sqlite;

use std::error::Error;

use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;

use crate::record::{Company, CompanySnapshot};

pub use sqlite::SqliteStore;

/// A persistence operation failure, labelled with the operation that
/// failed so callers can tell which stage of a workflow broke.
#[derive(Debug, ThisError)]
#[error("store operation `{op}` failed: {source}")]
pub struct StoreError {
    op: &'static str,
    source: Box<dyn Error + Send + Sync>,
}

impl StoreError {
    /// Wraps an underlying failure under the given operation label.
    pub fn new(op: &'static str, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self { op, source: source.into() }
    }

    /// The label of the operation that failed.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.op
    }
}

/// Persistence operations over live records, used-name mappings, and
/// history snapshots.
pub trait RecordStore: Send + Sync {
    /// Loads the live record for a registry id, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn find_by_registry_id(&self, registry_id: i64) -> Result<Option<Company>, StoreError>;

    /// Resolves a name (current or historical) to its registry id via the
    /// used-name mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn resolve_used_name(&self, name: &str) -> Result<Option<i64>, StoreError>;

    /// Inserts a new live record. Fails if the registry id or name is
    /// already taken by a live row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn create(&self, company: &Company) -> Result<(), StoreError>;

    /// Refreshes only the check timestamp of an existing live record.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or no row matches.
    fn touch(&self, registry_id: i64, checked_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Deletes the live record for a registry id.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete(&self, registry_id: i64) -> Result<(), StoreError>;

    /// Appends a history snapshot. Snapshots are never updated or deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn append_snapshot(&self, snapshot: &CompanySnapshot) -> Result<(), StoreError>;

    /// Records that `name` resolves to `registry_id`, doing nothing if the
    /// pair is already present (find-or-create, not unconditional insert).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn ensure_used_name(&self, name: &str, registry_id: i64) -> Result<(), StoreError>;

    /// Lists history snapshots for a registry id, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn snapshots_for(&self, registry_id: i64) -> Result<Vec<CompanySnapshot>, StoreError>;

    /// Archives the pre-change state and installs the replacement record:
    /// append snapshot, delete the old live row, insert the new one, and
    /// make sure the new name maps to the registry id.
    ///
    /// A partial outcome (old row gone, no new row) is a correctness
    /// violation; transactional adapters must run this as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    fn archive_and_replace(
        &self,
        snapshot: &CompanySnapshot,
        new: &Company,
    ) -> Result<(), StoreError> {
        self.append_snapshot(snapshot)?;
        self.delete(snapshot.registry_id)?;
        self.create(new)?;
        self.ensure_used_name(&new.name, new.registry_id)
    }

    /// Inserts a first-seen record together with its used-name mapping.
    ///
    /// Same atomicity expectation as [`RecordStore::archive_and_replace`]:
    /// a record without a mapping is a correctness violation.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails.
    fn create_with_used_name(&self, company: &Company) -> Result<(), StoreError> {
        self.create(company)?;
        self.ensure_used_name(&company.name, company.registry_id)
    }
}
