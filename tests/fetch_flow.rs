//! End-to-end reconcile flow over the real SQLite store adapter.
//!
//! The registry and clock are test doubles; persistence is the shipped
//! adapter with its transactional composites, so these tests cover the
//! full create / touch / archive / rename lifecycle against real SQL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use regmirror::engine::ReconcileEngine;
use regmirror::ports::{Clock, LookupFuture, NotificationSink, RegistrySource, SourceError};
use regmirror::record::{CompanyProfile, SourceRecord};
use regmirror::store::{RecordStore, SqliteStore};

#[derive(Default)]
struct StubSource {
    responses: Mutex<HashMap<String, SourceRecord>>,
    calls: AtomicUsize,
}

impl StubSource {
    fn respond_to(&self, query: &str, record: SourceRecord) {
        self.responses.lock().unwrap().insert(query.to_string(), record);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RegistrySource for StubSource {
    fn lookup(&self, name: &str) -> LookupFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.responses.lock().unwrap().get(name).cloned();
        Box::pin(async move { outcome.ok_or(SourceError::NotFound) })
    }
}

struct SettableClock(Mutex<DateTime<Utc>>);

impl SettableClock {
    fn set(&self, at: DateTime<Utc>) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for SettableClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<String>>);

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

struct Fixture {
    engine: ReconcileEngine,
    store: Arc<SqliteStore>,
    source: Arc<StubSource>,
    clock: Arc<SettableClock>,
    sink: Arc<RecordingSink>,
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
}

fn fixture() -> Fixture {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    store.init_schema().unwrap();
    let source = Arc::new(StubSource::default());
    let clock = Arc::new(SettableClock(Mutex::new(t0())));
    let sink = Arc::new(RecordingSink::default());
    let engine = ReconcileEngine::new(
        Arc::clone(&store) as Arc<dyn RecordStore>,
        Arc::clone(&source) as Arc<dyn RegistrySource>,
        Arc::clone(&sink) as Arc<dyn NotificationSink>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        Duration::days(30),
    );
    Fixture { engine, store, source, clock, sink }
}

fn record(registry_id: i64, name: &str, status: &str) -> SourceRecord {
    SourceRecord {
        registry_id,
        name: name.to_string(),
        profile: CompanyProfile { reg_status: status.to_string(), ..CompanyProfile::default() },
    }
}

#[tokio::test]
async fn mirror_lifecycle_create_cache_archive_touch() {
    let f = fixture();
    f.source.respond_to("Acme Widgets Ltd", record(42, "Acme Widgets Ltd", "in business"));

    // First fetch mirrors the company and its name mapping.
    let first = f.engine.fetch("Acme Widgets Ltd").await.unwrap();
    assert_eq!(first.registry_id, 42);
    assert_eq!(f.store.resolve_used_name("Acme Widgets Ltd").unwrap(), Some(42));
    assert_eq!(f.source.calls(), 1);

    // A second fetch inside the staleness window never hits the registry.
    let second = f.engine.fetch("Acme Widgets Ltd").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(f.source.calls(), 1);

    // Past the window with changed content: archive then replace.
    f.clock.set(t0() + Duration::days(31));
    f.source.respond_to("Acme Widgets Ltd", record(42, "Acme Widgets Ltd", "revoked"));
    let third = f.engine.fetch("Acme Widgets Ltd").await.unwrap();
    assert_eq!(third.profile.reg_status, "revoked");
    assert_ne!(third.fingerprint, first.fingerprint);

    let snapshots = f.store.snapshots_for(42).unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].profile.reg_status, "in business");

    // Past the window again with identical content: timestamp refresh only.
    f.clock.set(t0() + Duration::days(62));
    let fourth = f.engine.fetch("Acme Widgets Ltd").await.unwrap();
    assert_eq!(fourth.profile.reg_status, "revoked");
    assert_eq!(f.store.snapshots_for(42).unwrap().len(), 1);

    let live = f.store.find_by_registry_id(42).unwrap().unwrap();
    assert_eq!(live.checked_at, t0() + Duration::days(62));
    assert!(f.sink.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rename_flow_alerts_and_remaps() {
    let f = fixture();
    f.source.respond_to("Old Corp", record(7, "Old Corp", "in business"));
    f.engine.fetch("Old Corp").await.unwrap();

    // The registry renamed the entity; a caller asks by the new name,
    // which has no mapping yet.
    f.source.respond_to("New Corp", record(7, "New Corp", "in business"));
    let renamed = f.engine.fetch("New Corp").await.unwrap();

    assert_eq!(renamed.name, "New Corp");
    assert_eq!(f.store.resolve_used_name("New Corp").unwrap(), Some(7));
    assert_eq!(f.store.resolve_used_name("Old Corp").unwrap(), Some(7));

    let messages = f.sink.0.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Old Corp"));
    assert!(messages[0].contains("New Corp"));
    drop(messages);

    // The name change itself is a content change: exactly one snapshot,
    // still exactly one live row.
    let snapshots = f.store.snapshots_for(7).unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].name, "Old Corp");
    assert!(f.store.find_by_registry_id(7).unwrap().is_some());
}

#[tokio::test]
async fn not_found_leaves_the_mirror_untouched() {
    let f = fixture();

    let err = f.engine.fetch("Nobody Knows Ltd").await.unwrap_err();

    assert!(err.is_user_facing());
    assert_eq!(f.store.resolve_used_name("Nobody Knows Ltd").unwrap(), None);
}
