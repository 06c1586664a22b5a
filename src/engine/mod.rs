//! Reconcile engine — the decision core of the mirror.
//!
//! One entry point, [`ReconcileEngine::fetch`]: given a company name,
//! serve the cached record if fresh, otherwise re-fetch from the registry,
//! detect renames, diff the fetched content against the cached record, and
//! archive-then-replace when it changed. Everything external (time,
//! registry, persistence, alerts) arrives through ports, so the whole
//! workflow runs deterministically under test.

mod lock;

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::ports::{Clock, NotificationSink, RegistrySource};
use crate::record::Company;
use crate::store::RecordStore;

use lock::KeyedLock;

/// Orchestrates the fetch/cache/diff/archive workflow.
pub struct ReconcileEngine {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn RegistrySource>,
    notify: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    staleness: Duration,
    name_locks: KeyedLock<String>,
    id_locks: KeyedLock<i64>,
}

impl ReconcileEngine {
    /// Builds an engine over the given ports.
    ///
    /// `staleness` is the window after which a cached record must be
    /// re-verified against the registry; it is measured from the last
    /// check time, not the last content change.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn RegistrySource>,
        notify: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        staleness: Duration,
    ) -> Self {
        Self {
            store,
            source,
            notify,
            clock,
            staleness,
            name_locks: KeyedLock::new(),
            id_locks: KeyedLock::new(),
        }
    }

    /// Returns the current record for `name`, refreshing the mirror from
    /// the registry when the cached copy is stale or missing.
    ///
    /// Calls for the same name serialize on a per-name lock; once the
    /// registry response reveals the registry id, the read-diff-write
    /// section also serializes per id, so two names resolving to the same
    /// entity cannot race the archive.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] naming the failed stage; see the error
    /// taxonomy for the split between user-facing and infrastructure
    /// failures.
    pub async fn fetch(&self, name: &str) -> Result<Company, FetchError> {
        if name.is_empty() {
            return Err(FetchError::EmptyName);
        }
        let _name_guard = self.name_locks.acquire(name.to_string()).await;

        let cached = self.lookup(name)?;
        let mapping_found = cached.is_some();

        if let Some(cached) = &cached {
            if cached.checked_at + self.staleness > self.clock.now() {
                debug!(name, registry_id = cached.registry_id, "serving fresh cached record");
                return Ok(cached.clone());
            }
            debug!(name, registry_id = cached.registry_id, "cached record is stale");
        }

        let fetched = self.source.lookup(name).await?;
        let registry_id = fetched.registry_id;

        // Everything from here reads and writes the entity's rows, so it
        // runs under the id lock, and the live record is re-read inside it.
        let _id_guard = self.id_locks.acquire(registry_id).await;

        let now = self.clock.now();
        let candidate = Company::from_source(fetched, now)?;
        let prior = self.store.find_by_registry_id(registry_id)?;

        let prior = match prior {
            Some(prior) if !mapping_found => {
                // The queried name had no mapping, yet the entity is
                // already mirrored: it was renamed at the registry.
                if prior.name != name {
                    warn!(
                        queried = name,
                        cached = %prior.name,
                        current = %candidate.name,
                        "registry entity renamed"
                    );
                    self.notify.notify(&format!(
                        "company renamed at the registry: queried {name:?}, \
                         mirrored as {:?}, registry now says {:?}",
                        prior.name, candidate.name
                    ));
                }
                self.store.ensure_used_name(name, registry_id)?;
                Some(prior)
            }
            other => other,
        };

        match prior {
            None => {
                debug!(name = %candidate.name, registry_id, "mirroring first-seen company");
                self.store.create_with_used_name(&candidate)?;
                Ok(candidate)
            }
            Some(prior) if prior.fingerprint == candidate.fingerprint => {
                self.store.touch(registry_id, now)?;
                debug!(name = %prior.name, registry_id, "content unchanged, refreshed check time");
                Ok(prior)
            }
            Some(prior) => {
                let snapshot = prior.to_snapshot(now);
                self.store.archive_and_replace(&snapshot, &candidate)?;
                debug!(
                    name = %candidate.name,
                    registry_id,
                    snapshot_id = %snapshot.snapshot_id,
                    "content changed, archived previous record"
                );
                Ok(candidate)
            }
        }
    }

    /// Resolves `name` through the used-name mapping and loads the live
    /// record. A mapping that points at a missing record is an internal
    /// consistency violation.
    fn lookup(&self, name: &str) -> Result<Option<Company>, FetchError> {
        let Some(registry_id) = self.store.resolve_used_name(name)? else {
            return Ok(None);
        };
        match self.store.find_by_registry_id(registry_id)? {
            Some(company) => Ok(Some(company)),
            None => Err(FetchError::Consistency { name: name.to_string(), registry_id }),
        }
    }
}
