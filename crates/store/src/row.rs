//! The transactional row-store contract.
//!
//! The KV facade consumes the backing engine exclusively through this
//! trait. Implementations own a single connection and at most one active
//! transaction; every row operation executes against the transaction when
//! one is open and against the plain connection otherwise, without the
//! caller having to route anything.

use crate::error::Result;

/// A transactional store of (bucket, key) → value rows plus a side table
/// of per-key mime strings.
///
/// All methods are blocking and take `&mut self`: a store is session
/// state, not a shared service. Callers wanting concurrency open one
/// store per caller.
///
/// # Contract
///
/// - `open` and `close` are idempotent.
/// - `begin`/`commit`/`rollback` manage a single transaction; `commit`
///   and `rollback` outside a transaction are silent no-ops.
/// - Row operations transparently execute inside the active transaction
///   when there is one.
/// - Counter operations are single atomic statements; two calls on the
///   same connection can never interleave their read and write halves.
pub trait RowStore {
    /// Open the backing connection and ensure the schema exists.
    ///
    /// No-op when already open. Never alters an existing schema.
    fn open(&mut self) -> Result<()>;

    /// Release the connection.
    ///
    /// An active transaction is rolled back first. No-op when already
    /// closed.
    fn close(&mut self) -> Result<()>;

    /// Whether a connection is currently held.
    fn is_open(&self) -> bool;

    /// Begin a transaction.
    ///
    /// Fails with [`StoreError::NotOpen`] when no connection is held and
    /// with [`StoreError::AlreadyInTransaction`] when nested.
    ///
    /// [`StoreError::NotOpen`]: crate::StoreError::NotOpen
    /// [`StoreError::AlreadyInTransaction`]: crate::StoreError::AlreadyInTransaction
    fn begin(&mut self) -> Result<()>;

    /// Commit the active transaction. Silent no-op without one.
    fn commit(&mut self) -> Result<()>;

    /// Roll back the active transaction. Silent no-op without one.
    fn rollback(&mut self) -> Result<()>;

    /// Whether a transaction is currently active.
    fn in_transaction(&self) -> bool;

    /// Fetch the value stored for (bucket, key), if any.
    fn get_row(&mut self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or replace the value for (bucket, key).
    fn upsert_row(&mut self, bucket: &str, key: &str, value: &[u8]) -> Result<()>;

    /// Delete the row for (bucket, key). Succeeds when absent.
    fn delete_row(&mut self, bucket: &str, key: &str) -> Result<()>;

    /// List the keys in `bucket` whose name starts with `prefix`.
    ///
    /// Order is backend-defined. The prefix is matched literally; it is
    /// not a wildcard pattern.
    fn scan_prefix(&mut self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Fetch the mime string recorded for `key`, if any.
    fn get_mime_row(&mut self, key: &str) -> Result<Option<String>>;

    /// Insert or replace the mime string for `key`.
    fn upsert_mime_row(&mut self, key: &str, mime: &str) -> Result<()>;

    /// Delete the mime row for `key`. Succeeds when absent.
    fn delete_mime_row(&mut self, key: &str) -> Result<()>;

    /// Initialize the counter at (bucket, key) to `init` if absent, then
    /// return the current value, in one atomic statement.
    fn counter_init_or_get(&mut self, bucket: &str, key: &str, init: i64) -> Result<i64>;

    /// Add `delta` to the counter at (bucket, key), treating an absent
    /// counter as zero, and return the new value, in one atomic
    /// statement.
    fn counter_add(&mut self, bucket: &str, key: &str, delta: i64) -> Result<i64>;
}
