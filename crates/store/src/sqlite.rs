//! SQLite-backed row store.
//!
//! One connection per store, opened lazily by the caller and configured
//! once at open time (WAL journal, busy timeout). The schema is created
//! if absent and never altered. Transactions are driven with explicit
//! `BEGIN IMMEDIATE` / `COMMIT` / `ROLLBACK` statements so that every row
//! operation issued between them executes inside the transaction without
//! any routing logic here or above.
//!
//! Schema:
//! - records: (bucket TEXT, key TEXT, value BLOB, PRIMARY KEY (bucket, key))
//! - mime_types: (key TEXT PRIMARY KEY, mime TEXT)

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::row::RowStore;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    bucket TEXT NOT NULL,
    key    TEXT NOT NULL,
    value  BLOB NOT NULL,
    PRIMARY KEY (bucket, key)
);
CREATE TABLE IF NOT EXISTS mime_types (
    key  TEXT NOT NULL PRIMARY KEY,
    mime TEXT NOT NULL
);
";

/// SQLite implementation of [`RowStore`].
///
/// The descriptor is a filesystem path, or `:memory:` for a database that
/// lives and dies with the connection.
///
/// # Example
///
/// ```ignore
/// let mut store = SqliteStore::new("./shelf.db");
/// store.open()?;
/// store.upsert_row("default", "greeting", b"hello")?;
/// ```
pub struct SqliteStore {
    path: PathBuf,
    conn: Option<Connection>,
    in_txn: bool,
}

impl SqliteStore {
    /// Create a store for the given descriptor. Does not connect.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: None,
            in_txn: false,
        }
    }

    /// Create a store backed by an in-memory database.
    ///
    /// All data is lost when the connection closes, so pairing this with
    /// close-after-every-operation callers leaves nothing behind.
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// The descriptor this store was created with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(StoreError::NotOpen)
    }
}

/// Escape a caller-supplied prefix for use in a `LIKE ... ESCAPE '\'`
/// pattern. `%` and `_` must match themselves, never act as wildcards.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl RowStore for SqliteStore {
    fn open(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let conn = Connection::open(&self.path).map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })?;

        // Connection-wide settings, applied once per open. WAL keeps
        // concurrent handles on the same file from blocking readers; the
        // busy timeout makes writer contention wait instead of failing.
        let configure = || -> rusqlite::Result<()> {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch(SCHEMA)
        };
        configure().map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "opened sqlite store");
        self.conn = Some(conn);
        self.in_txn = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        if self.in_txn {
            warn!("closing store with an active transaction; rolling back");
            self.in_txn = false;
            conn.execute_batch("ROLLBACK")
                .map_err(|source| StoreError::Transaction { source })?;
        }

        debug!(path = %self.path.display(), "closing sqlite store");
        conn.close()
            .map_err(|(_conn, source)| StoreError::Close { source })
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn begin(&mut self) -> Result<()> {
        let conn = self.conn()?;
        if self.in_txn {
            return Err(StoreError::AlreadyInTransaction);
        }
        // IMMEDIATE takes the write lock up front so the transaction
        // cannot fail with a lock upgrade once work has been done.
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|source| StoreError::Transaction { source })?;
        self.in_txn = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.in_txn {
            return Ok(());
        }
        let conn = self.conn()?;
        conn.execute_batch("COMMIT")
            .map_err(|source| StoreError::Transaction { source })?;
        self.in_txn = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.in_txn {
            return Ok(());
        }
        let conn = self.conn()?;
        conn.execute_batch("ROLLBACK")
            .map_err(|source| StoreError::Transaction { source })?;
        self.in_txn = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_txn
    }

    fn get_row(&mut self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn()?
            .query_row(
                "SELECT value FROM records WHERE bucket = ?1 AND key = ?2",
                params![bucket, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| StoreError::Query { source })
    }

    fn upsert_row(&mut self, bucket: &str, key: &str, value: &[u8]) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO records (bucket, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value",
                params![bucket, key, value],
            )
            .map_err(|source| StoreError::Execute { source })?;
        Ok(())
    }

    fn delete_row(&mut self, bucket: &str, key: &str) -> Result<()> {
        self.conn()?
            .execute(
                "DELETE FROM records WHERE bucket = ?1 AND key = ?2",
                params![bucket, key],
            )
            .map_err(|source| StoreError::Execute { source })?;
        Ok(())
    }

    fn scan_prefix(&mut self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM records WHERE bucket = ?1 AND key LIKE ?2 ESCAPE '\\'")
            .map_err(|source| StoreError::Query { source })?;
        let rows = stmt
            .query_map(params![bucket, like_prefix(prefix)], |row| row.get(0))
            .map_err(|source| StoreError::Query { source })?;

        let mut keys = Vec::new();
        for key in rows {
            keys.push(key.map_err(|source| StoreError::Query { source })?);
        }
        Ok(keys)
    }

    fn get_mime_row(&mut self, key: &str) -> Result<Option<String>> {
        self.conn()?
            .query_row(
                "SELECT mime FROM mime_types WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| StoreError::Query { source })
    }

    fn upsert_mime_row(&mut self, key: &str, mime: &str) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO mime_types (key, mime) VALUES (?1, ?2)
                 ON CONFLICT (key) DO UPDATE SET mime = excluded.mime",
                params![key, mime],
            )
            .map_err(|source| StoreError::Execute { source })?;
        Ok(())
    }

    fn delete_mime_row(&mut self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM mime_types WHERE key = ?1", params![key])
            .map_err(|source| StoreError::Execute { source })?;
        Ok(())
    }

    fn counter_init_or_get(&mut self, bucket: &str, key: &str, init: i64) -> Result<i64> {
        // Counter values are stored as decimal text so they remain
        // ordinary records. The no-op DO UPDATE makes RETURNING yield the
        // stored value whether or not the insert took.
        self.conn()?
            .query_row(
                "INSERT INTO records (bucket, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (bucket, key) DO UPDATE SET value = value
                 RETURNING CAST(value AS INTEGER)",
                params![bucket, key, init.to_string()],
                |row| row.get(0),
            )
            .map_err(|source| StoreError::Execute { source })
    }

    fn counter_add(&mut self, bucket: &str, key: &str, delta: i64) -> Result<i64> {
        // An absent counter behaves as zero, so the inserted value is the
        // delta itself.
        self.conn()?
            .query_row(
                "INSERT INTO records (bucket, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (bucket, key) DO UPDATE
                     SET value = CAST(CAST(value AS INTEGER) + ?4 AS TEXT)
                 RETURNING CAST(value AS INTEGER)",
                params![bucket, key, delta.to_string(), delta],
                |row| row.get(0),
            )
            .map_err(|source| StoreError::Execute { source })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn open_store() -> SqliteStore {
        let mut store = SqliteStore::in_memory();
        store.open().unwrap();
        store
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[test]
    fn open_is_idempotent() {
        let mut store = open_store();
        store.upsert_row("b", "k", b"v").unwrap();

        store.open().unwrap();

        // A second open must not replace the connection (an in-memory
        // database would lose its contents if it did).
        assert_eq!(store.get_row("b", "k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn close_is_idempotent() {
        let mut store = open_store();
        store.close().unwrap();
        store.close().unwrap();
        assert!(!store.is_open());
    }

    #[test]
    fn operations_on_closed_store_fail() {
        let mut store = SqliteStore::in_memory();
        let err = store.get_row("b", "k").unwrap_err();
        assert!(matches!(err, StoreError::NotOpen));
    }

    #[test]
    fn data_survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let mut store = SqliteStore::new(&path);
        store.open().unwrap();
        store.upsert_row("b", "k", b"v").unwrap();
        store.close().unwrap();

        let mut store = SqliteStore::new(&path);
        store.open().unwrap();
        assert_eq!(store.get_row("b", "k").unwrap(), Some(b"v".to_vec()));
    }

    // ========================================================================
    // Rows
    // ========================================================================

    #[test]
    fn get_absent_row_returns_none() {
        let mut store = open_store();
        assert_eq!(store.get_row("b", "missing").unwrap(), None);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = open_store();
        store.upsert_row("b", "k", b"one").unwrap();
        store.upsert_row("b", "k", b"two").unwrap();

        assert_eq!(store.get_row("b", "k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.scan_prefix("b", "").unwrap().len(), 1);
    }

    #[test]
    fn delete_absent_row_succeeds() {
        let mut store = open_store();
        store.delete_row("b", "missing").unwrap();
    }

    #[test]
    fn empty_value_is_stored() {
        let mut store = open_store();
        store.upsert_row("b", "k", b"").unwrap();
        assert_eq!(store.get_row("b", "k").unwrap(), Some(Vec::new()));
    }

    // ========================================================================
    // Prefix scans
    // ========================================================================

    #[test]
    fn scan_prefix_filters_by_bucket_and_prefix() {
        let mut store = open_store();
        store.upsert_row("b", "sample1", b"1").unwrap();
        store.upsert_row("b", "sample2", b"2").unwrap();
        store.upsert_row("b", "other1", b"3").unwrap();
        store.upsert_row("c", "sample3", b"4").unwrap();

        let mut keys = store.scan_prefix("b", "sample").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["sample1", "sample2"]);
    }

    #[test]
    fn scan_prefix_treats_wildcards_literally() {
        let mut store = open_store();
        store.upsert_row("b", "a%b", b"1").unwrap();
        store.upsert_row("b", "axb", b"2").unwrap();
        store.upsert_row("b", "a_c", b"3").unwrap();
        store.upsert_row("b", "azc", b"4").unwrap();

        assert_eq!(store.scan_prefix("b", "a%").unwrap(), vec!["a%b"]);
        assert_eq!(store.scan_prefix("b", "a_").unwrap(), vec!["a_c"]);
    }

    #[test]
    fn like_prefix_escapes_special_characters() {
        assert_eq!(like_prefix("plain"), "plain%");
        assert_eq!(like_prefix("50%_off"), "50\\%\\_off%");
        assert_eq!(like_prefix("back\\slash"), "back\\\\slash%");
        assert_eq!(like_prefix(""), "%");
    }

    // ========================================================================
    // Counters
    // ========================================================================

    #[test]
    fn counter_init_or_get_initializes_once() {
        let mut store = open_store();
        assert_eq!(store.counter_init_or_get("b", "n", 5).unwrap(), 5);
        assert_eq!(store.counter_init_or_get("b", "n", 99).unwrap(), 5);
    }

    #[test]
    fn counter_add_treats_absent_as_zero() {
        let mut store = open_store();
        assert_eq!(store.counter_add("b", "n", 1).unwrap(), 1);
        assert_eq!(store.counter_add("b", "n", 1).unwrap(), 2);
        assert_eq!(store.counter_add("b", "n", -3).unwrap(), -1);
    }

    #[test]
    fn counter_value_is_stored_as_decimal_text() {
        let mut store = open_store();
        store.counter_add("b", "n", 7).unwrap();
        assert_eq!(store.get_row("b", "n").unwrap(), Some(b"7".to_vec()));
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    #[test]
    fn begin_requires_open_connection() {
        let mut store = SqliteStore::in_memory();
        assert!(matches!(store.begin().unwrap_err(), StoreError::NotOpen));
    }

    #[test]
    fn nested_begin_fails() {
        let mut store = open_store();
        store.begin().unwrap();
        assert!(matches!(
            store.begin().unwrap_err(),
            StoreError::AlreadyInTransaction
        ));
    }

    #[test]
    fn commit_and_rollback_without_transaction_are_noops() {
        let mut store = open_store();
        store.commit().unwrap();
        store.rollback().unwrap();
    }

    #[test]
    fn rollback_discards_writes() {
        let mut store = open_store();
        store.begin().unwrap();
        store.upsert_row("b", "k", b"v").unwrap();
        store.rollback().unwrap();

        assert_eq!(store.get_row("b", "k").unwrap(), None);
        assert!(!store.in_transaction());
    }

    #[test]
    fn commit_makes_writes_visible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let mut store = SqliteStore::new(&path);
        store.open().unwrap();
        store.begin().unwrap();
        store.upsert_row("b", "k", b"v").unwrap();
        store.commit().unwrap();
        store.close().unwrap();

        let mut store = SqliteStore::new(&path);
        store.open().unwrap();
        assert_eq!(store.get_row("b", "k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn close_rolls_back_active_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let mut store = SqliteStore::new(&path);
        store.open().unwrap();
        store.begin().unwrap();
        store.upsert_row("b", "k", b"v").unwrap();
        store.close().unwrap();

        let mut store = SqliteStore::new(&path);
        store.open().unwrap();
        assert_eq!(store.get_row("b", "k").unwrap(), None);
    }

    // ========================================================================
    // Properties
    // ========================================================================

    proptest! {
        #[test]
        fn roundtrip_arbitrary_values(
            key in "[a-z]{1,20}",
            value in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let mut store = open_store();
            store.upsert_row("b", &key, &value).unwrap();
            prop_assert_eq!(store.get_row("b", &key).unwrap(), Some(value));
        }
    }
}
