// 🗄️ SQLite Store - hashes and sets in two tables, one transaction per batch
//
// WAL mode for crash recovery. A key lives in exactly one of the two tables;
// touching it through the other kind is a WrongType error, as in Redis.

use super::{Batch, FieldMap, KeyValueStore, Mutation, ValueKind};
use crate::error::StorageError;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened sqlite store");
        Self::from_connection(conn)
    }

    /// Private database that disappears with the store
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases answer "memory")
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    // ==========================================================================
    // Hashes: one row per (key, field)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_hash (
            key TEXT NOT NULL,
            field TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (key, field)
        ) WITHOUT ROWID",
        [],
    )?;

    // ==========================================================================
    // Sets: one row per (key, member)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_set (
            key TEXT NOT NULL,
            member TEXT NOT NULL,
            PRIMARY KEY (key, member)
        ) WITHOUT ROWID",
        [],
    )?;

    Ok(())
}

fn kind_of(conn: &Connection, key: &str) -> rusqlite::Result<Option<ValueKind>> {
    let in_hash: bool = conn
        .prepare_cached("SELECT EXISTS(SELECT 1 FROM kv_hash WHERE key = ?1)")?
        .query_row(params![key], |row| row.get(0))?;
    if in_hash {
        return Ok(Some(ValueKind::Hash));
    }

    let in_set: bool = conn
        .prepare_cached("SELECT EXISTS(SELECT 1 FROM kv_set WHERE key = ?1)")?
        .query_row(params![key], |row| row.get(0))?;
    Ok(in_set.then_some(ValueKind::Set))
}

/// Fail unless `key` is absent or already holds `expected`.
fn expect_kind(conn: &Connection, key: &str, expected: ValueKind) -> Result<(), StorageError> {
    match kind_of(conn, key)? {
        Some(found) if found != expected => Err(StorageError::WrongType {
            key: key.to_string(),
            expected: expected.as_str(),
        }),
        _ => Ok(()),
    }
}

fn apply_mutation(tx: &Transaction<'_>, mutation: Mutation) -> Result<(), StorageError> {
    match mutation {
        Mutation::HashSet { key, fields } => {
            expect_kind(tx, &key, ValueKind::Hash)?;
            let mut stmt = tx.prepare_cached(
                "INSERT INTO kv_hash (key, field, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key, field) DO UPDATE SET value = excluded.value",
            )?;
            for (field, value) in &fields {
                stmt.execute(params![key, field, value])?;
            }
        }
        Mutation::SetAdd { key, member } => {
            expect_kind(tx, &key, ValueKind::Set)?;
            tx.prepare_cached("INSERT OR IGNORE INTO kv_set (key, member) VALUES (?1, ?2)")?
                .execute(params![key, member])?;
        }
        Mutation::SetRemove { key, member } => {
            expect_kind(tx, &key, ValueKind::Set)?;
            tx.prepare_cached("DELETE FROM kv_set WHERE key = ?1 AND member = ?2")?
                .execute(params![key, member])?;
        }
        Mutation::Delete { key } => {
            tx.prepare_cached("DELETE FROM kv_hash WHERE key = ?1")?
                .execute(params![key])?;
            tx.prepare_cached("DELETE FROM kv_set WHERE key = ?1")?
                .execute(params![key])?;
        }
    }
    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn hash_get_all(&self, key: &str) -> Result<Option<FieldMap>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT field, value FROM kv_hash WHERE key = ?1")?;
        let fields = stmt
            .query_map(params![key], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<FieldMap>>()?;

        if !fields.is_empty() {
            return Ok(Some(fields));
        }
        expect_kind(&conn, key, ValueKind::Hash)?;
        Ok(None)
    }

    fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        expect_kind(&conn, key, ValueKind::Hash)?;
        let value = conn
            .prepare_cached("SELECT value FROM kv_hash WHERE key = ?1 AND field = ?2")?
            .query_row(params![key, field], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_members(&self, key: &str) -> Result<BTreeSet<String>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT member FROM kv_set WHERE key = ?1")?;
        let members = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<String>>>()?;

        if members.is_empty() {
            expect_kind(&conn, key, ValueKind::Set)?;
        }
        Ok(members)
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let conn = self.lock()?;
        Ok(kind_of(&conn, key)?.is_some())
    }

    fn apply(&self, batch: Batch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let count = batch.len();
        for mutation in batch {
            // Returning early drops `tx`, which rolls the whole batch back
            apply_mutation(&tx, mutation)?;
        }
        tx.commit()?;

        debug!(mutations = count, "committed batch");
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM kv_hash; DELETE FROM kv_set;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_hash_and_set_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut batch = Batch::new();
        batch
            .hash_set("swiftCode:AAISALTRXXX", fields(&[("bankName", "UNITED BANK OF ALBANIA SH.A")]))
            .set_add("idx:countryISO2:AL", "swiftCode:AAISALTRXXX")
            .set_add("idx:countryISO2:AL", "swiftCode:AAISALTRXXX");
        store.apply(batch).unwrap();

        let hash = store.hash_get_all("swiftCode:AAISALTRXXX").unwrap().unwrap();
        assert_eq!(hash.get("bankName").map(String::as_str), Some("UNITED BANK OF ALBANIA SH.A"));

        let members = store.set_members("idx:countryISO2:AL").unwrap();
        assert_eq!(members.len(), 1);
        assert!(store.exists("idx:countryISO2:AL").unwrap());
        assert!(!store.exists("idx:countryISO2:MC").unwrap());
    }

    #[test]
    fn test_hash_set_overwrites_field() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut batch = Batch::new();
        batch.hash_set_field("countries", "MC", "MONACO");
        batch.hash_set_field("countries", "MC", "PRINCIPALITY OF MONACO");
        store.apply(batch).unwrap();

        assert_eq!(
            store.hash_get("countries", "MC").unwrap().as_deref(),
            Some("PRINCIPALITY OF MONACO")
        );
        assert_eq!(store.hash_get("countries", "XX").unwrap(), None);
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut seed = Batch::new();
        seed.hash_set_field("h", "a", "1");
        store.apply(seed).unwrap();

        let mut batch = Batch::new();
        batch.set_add("s", "x").delete("h").hash_set_field("s", "f", "v");
        let err = store.apply(batch).unwrap_err();

        assert!(matches!(err, StorageError::WrongType { .. }));
        assert!(!store.exists("s").unwrap());
        assert_eq!(store.hash_get("h", "a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_delete_removes_either_kind() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut batch = Batch::new();
        batch.hash_set_field("h", "a", "1").set_add("s", "x");
        store.apply(batch).unwrap();

        let mut batch = Batch::new();
        batch.delete("h").delete("s").delete("never-existed");
        store.apply(batch).unwrap();

        assert!(!store.exists("h").unwrap());
        assert!(!store.exists("s").unwrap());
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("directory.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            let mut batch = Batch::new();
            batch.set_add("branch:BCHICLRM", "BCHICLRM001");
            store.apply(batch).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let members = reopened.set_members("branch:BCHICLRM").unwrap();
        assert!(members.contains("BCHICLRM001"));
    }

    #[test]
    fn test_flush() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut batch = Batch::new();
        batch.hash_set_field("h", "a", "1").set_add("s", "x");
        store.apply(batch).unwrap();

        store.flush().unwrap();
        assert!(!store.exists("h").unwrap());
        assert!(!store.exists("s").unwrap());
    }
}
