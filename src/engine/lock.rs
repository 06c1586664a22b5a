//! Per-key serialization for reconcile calls.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A table of async mutexes, one per key.
///
/// The engine uses one table keyed by lookup name and one keyed by
/// registry id to serialize concurrent fetches that touch the same entity.
/// The table keeps one small entry per distinct key ever acquired; the key
/// space is the set of names and ids actually queried.
pub(crate) struct KeyedLock<K> {
    entries: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K: Eq + Hash> KeyedLock<K> {
    pub(crate) fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    /// Acquires the lock for `key`, waiting if another task holds it.
    pub(crate) async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().expect("keyed lock table poisoned");
            Arc::clone(entries.entry(key).or_default())
        };
        entry.lock_owned().await
    }
}
