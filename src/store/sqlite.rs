//! SQLite adapter for the record store.
//!
//! Identity, name, fingerprint, and timestamps are real columns so the
//! uniqueness constraints live in the schema; the remaining business
//! attributes are stored as one JSON `profile` column, which the engine
//! treats as opaque anyway. Timestamps are RFC 3339 text.
//!
//! The schema is applied by an explicit [`SqliteStore::init_schema`] call
//! (the `init` subcommand), never as a side effect of opening the store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::record::{Company, CompanyProfile, CompanySnapshot};

use super::{RecordStore, StoreError};

/// Record store backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path, in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::new("open", e))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StoreError::new("open", e))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Opens an in-memory store, used by tests and throwaway runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::new("open", e))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Creates the three tables and their indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS companies (
                registry_id INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                profile     TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                checked_at  TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS used_names (
                name        TEXT NOT NULL,
                registry_id INTEGER NOT NULL,
                UNIQUE (name, registry_id)
            );
            CREATE INDEX IF NOT EXISTS idx_used_names_name
                ON used_names(name);
            CREATE INDEX IF NOT EXISTS idx_used_names_registry_id
                ON used_names(registry_id);
            CREATE TABLE IF NOT EXISTS company_snapshots (
                snapshot_id TEXT PRIMARY KEY,
                registry_id INTEGER NOT NULL,
                name        TEXT NOT NULL,
                profile     TEXT NOT NULL,
                checked_at  TEXT NOT NULL,
                archived_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_snapshots_registry_id
                ON company_snapshots(registry_id);
            CREATE INDEX IF NOT EXISTS idx_snapshots_name
                ON company_snapshots(name);",
        )
        .map_err(|e| StoreError::new("init_schema", e))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("sqlite connection lock poisoned")
    }
}

fn insert_company(conn: &Connection, op: &'static str, company: &Company) -> Result<(), StoreError> {
    let profile =
        serde_json::to_string(&company.profile).map_err(|e| StoreError::new(op, e))?;
    conn.execute(
        "INSERT INTO companies (registry_id, name, profile, fingerprint, checked_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            company.registry_id,
            company.name,
            profile,
            company.fingerprint,
            company.checked_at.to_rfc3339(),
        ],
    )
    .map_err(|e| StoreError::new(op, e))?;
    Ok(())
}

fn insert_snapshot(
    conn: &Connection,
    op: &'static str,
    snapshot: &CompanySnapshot,
) -> Result<(), StoreError> {
    let profile =
        serde_json::to_string(&snapshot.profile).map_err(|e| StoreError::new(op, e))?;
    conn.execute(
        "INSERT INTO company_snapshots
            (snapshot_id, registry_id, name, profile, checked_at, archived_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            snapshot.snapshot_id,
            snapshot.registry_id,
            snapshot.name,
            profile,
            snapshot.checked_at.to_rfc3339(),
            snapshot.archived_at.to_rfc3339(),
        ],
    )
    .map_err(|e| StoreError::new(op, e))?;
    Ok(())
}

fn insert_used_name(
    conn: &Connection,
    op: &'static str,
    name: &str,
    registry_id: i64,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO used_names (name, registry_id) VALUES (?1, ?2)",
        params![name, registry_id],
    )
    .map_err(|e| StoreError::new(op, e))?;
    Ok(())
}

fn delete_company(conn: &Connection, op: &'static str, registry_id: i64) -> Result<(), StoreError> {
    conn.execute("DELETE FROM companies WHERE registry_id = ?1", params![registry_id])
        .map_err(|e| StoreError::new(op, e))?;
    Ok(())
}

fn parse_profile(op: &'static str, raw: &str) -> Result<CompanyProfile, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::new(op, e))
}

fn parse_timestamp(op: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::new(op, e))
}

impl RecordStore for SqliteStore {
    fn find_by_registry_id(&self, registry_id: i64) -> Result<Option<Company>, StoreError> {
        const OP: &str = "find_by_registry_id";
        let conn = self.lock();
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT name, profile, fingerprint, checked_at
                 FROM companies WHERE registry_id = ?1",
                params![registry_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(|e| StoreError::new(OP, e))?;

        let Some((name, profile, fingerprint, checked_at)) = row else {
            return Ok(None);
        };
        Ok(Some(Company {
            registry_id,
            name,
            profile: parse_profile(OP, &profile)?,
            fingerprint,
            checked_at: parse_timestamp(OP, &checked_at)?,
        }))
    }

    fn resolve_used_name(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT registry_id FROM used_names WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError::new("resolve_used_name", e))
    }

    fn create(&self, company: &Company) -> Result<(), StoreError> {
        let conn = self.lock();
        insert_company(&conn, "create", company)
    }

    fn touch(&self, registry_id: i64, checked_at: DateTime<Utc>) -> Result<(), StoreError> {
        const OP: &str = "touch";
        let conn = self.lock();
        let updated = conn
            .execute(
                "UPDATE companies SET checked_at = ?1 WHERE registry_id = ?2",
                params![checked_at.to_rfc3339(), registry_id],
            )
            .map_err(|e| StoreError::new(OP, e))?;
        if updated == 0 {
            return Err(StoreError::new(OP, format!("no live record for registry id {registry_id}")));
        }
        Ok(())
    }

    fn delete(&self, registry_id: i64) -> Result<(), StoreError> {
        let conn = self.lock();
        delete_company(&conn, "delete", registry_id)
    }

    fn append_snapshot(&self, snapshot: &CompanySnapshot) -> Result<(), StoreError> {
        let conn = self.lock();
        insert_snapshot(&conn, "append_snapshot", snapshot)
    }

    fn ensure_used_name(&self, name: &str, registry_id: i64) -> Result<(), StoreError> {
        let conn = self.lock();
        insert_used_name(&conn, "ensure_used_name", name, registry_id)
    }

    fn snapshots_for(&self, registry_id: i64) -> Result<Vec<CompanySnapshot>, StoreError> {
        const OP: &str = "snapshots_for";
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT snapshot_id, name, profile, checked_at, archived_at
                 FROM company_snapshots
                 WHERE registry_id = ?1
                 ORDER BY archived_at DESC, snapshot_id",
            )
            .map_err(|e| StoreError::new(OP, e))?;
        let rows: Vec<(String, String, String, String, String)> = stmt
            .query_map(params![registry_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .map_err(|e| StoreError::new(OP, e))?
            .collect::<Result<_, _>>()
            .map_err(|e| StoreError::new(OP, e))?;

        rows.into_iter()
            .map(|(snapshot_id, name, profile, checked_at, archived_at)| {
                Ok(CompanySnapshot {
                    snapshot_id,
                    archived_at: parse_timestamp(OP, &archived_at)?,
                    registry_id,
                    name,
                    profile: parse_profile(OP, &profile)?,
                    checked_at: parse_timestamp(OP, &checked_at)?,
                })
            })
            .collect()
    }

    fn archive_and_replace(
        &self,
        snapshot: &CompanySnapshot,
        new: &Company,
    ) -> Result<(), StoreError> {
        const OP: &str = "archive_and_replace";
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(|e| StoreError::new(OP, e))?;
        insert_snapshot(&tx, OP, snapshot)?;
        delete_company(&tx, OP, snapshot.registry_id)?;
        insert_company(&tx, OP, new)?;
        insert_used_name(&tx, OP, &new.name, new.registry_id)?;
        tx.commit().map_err(|e| StoreError::new(OP, e))
    }

    fn create_with_used_name(&self, company: &Company) -> Result<(), StoreError> {
        const OP: &str = "create_with_used_name";
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(|e| StoreError::new(OP, e))?;
        insert_company(&tx, OP, company)?;
        insert_used_name(&tx, OP, &company.name, company.registry_id)?;
        tx.commit().map_err(|e| StoreError::new(OP, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceRecord;
    use chrono::TimeZone;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    fn company(registry_id: i64, name: &str, status: &str) -> Company {
        let record = SourceRecord {
            registry_id,
            name: name.to_string(),
            profile: CompanyProfile {
                reg_status: status.to_string(),
                ..CompanyProfile::default()
            },
        };
        Company::from_source(record, at(1)).unwrap()
    }

    #[test]
    fn init_schema_is_idempotent() {
        let store = store();
        store.init_schema().unwrap();
        store.create(&company(7, "Acme", "in business")).unwrap();
        store.init_schema().unwrap();
        assert!(store.find_by_registry_id(7).unwrap().is_some());
    }

    #[test]
    fn create_and_find_round_trips() {
        let store = store();
        let original = company(7, "Acme Widgets Ltd", "in business");

        store.create(&original).unwrap();
        let loaded = store.find_by_registry_id(7).unwrap().unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn find_missing_returns_none() {
        let store = store();
        assert!(store.find_by_registry_id(999).unwrap().is_none());
    }

    #[test]
    fn duplicate_create_fails() {
        let store = store();
        store.create(&company(7, "Acme", "in business")).unwrap();

        let err = store.create(&company(7, "Acme", "in business")).unwrap_err();
        assert_eq!(err.operation(), "create");
    }

    #[test]
    fn ensure_used_name_is_idempotent() {
        let store = store();
        store.ensure_used_name("Acme", 7).unwrap();
        store.ensure_used_name("Acme", 7).unwrap();

        assert_eq!(store.resolve_used_name("Acme").unwrap(), Some(7));
        let conn = store.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM used_names", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn resolve_unknown_name_returns_none() {
        let store = store();
        assert!(store.resolve_used_name("Nobody").unwrap().is_none());
    }

    #[test]
    fn touch_updates_only_checked_at() {
        let store = store();
        let original = company(7, "Acme", "in business");
        store.create(&original).unwrap();

        store.touch(7, at(20)).unwrap();

        let loaded = store.find_by_registry_id(7).unwrap().unwrap();
        assert_eq!(loaded.checked_at, at(20));
        assert_eq!(loaded.fingerprint, original.fingerprint);
        assert_eq!(loaded.profile, original.profile);
    }

    #[test]
    fn touch_without_row_fails() {
        let store = store();
        let err = store.touch(7, at(20)).unwrap_err();
        assert_eq!(err.operation(), "touch");
    }

    #[test]
    fn archive_and_replace_swaps_the_live_row() {
        let store = store();
        let old = company(7, "Acme", "in business");
        store.create_with_used_name(&old).unwrap();

        let new = company(7, "Acme", "revoked");
        let snapshot = old.to_snapshot(at(15));
        store.archive_and_replace(&snapshot, &new).unwrap();

        let live = store.find_by_registry_id(7).unwrap().unwrap();
        assert_eq!(live.profile.reg_status, "revoked");

        let snapshots = store.snapshots_for(7).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].profile.reg_status, "in business");
        assert_eq!(snapshots[0].archived_at, at(15));

        assert_eq!(store.resolve_used_name("Acme").unwrap(), Some(7));
    }

    #[test]
    fn snapshots_for_lists_newest_first() {
        let store = store();
        let first = company(7, "Acme", "in business");
        store.append_snapshot(&first.to_snapshot(at(2))).unwrap();
        store.append_snapshot(&first.to_snapshot(at(9))).unwrap();
        store.append_snapshot(&first.to_snapshot(at(5))).unwrap();

        let archived: Vec<DateTime<Utc>> =
            store.snapshots_for(7).unwrap().iter().map(|s| s.archived_at).collect();
        assert_eq!(archived, vec![at(9), at(5), at(2)]);
    }

    #[test]
    fn delete_removes_the_live_row() {
        let store = store();
        store.create(&company(7, "Acme", "in business")).unwrap();

        store.delete(7).unwrap();
        assert!(store.find_by_registry_id(7).unwrap().is_none());
    }

    #[test]
    fn create_with_used_name_writes_both() {
        let store = store();
        store.create_with_used_name(&company(7, "Acme", "in business")).unwrap();

        assert!(store.find_by_registry_id(7).unwrap().is_some());
        assert_eq!(store.resolve_used_name("Acme").unwrap(), Some(7));
    }
}
