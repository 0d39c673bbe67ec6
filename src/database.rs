//! Main database entry point for Shelf.
//!
//! This module provides the `Shelf` handle, the primary entry point for
//! all operations, together with its builder.

use std::fmt;
use std::path::{Path, PathBuf};

use shelf_store::{RowStore, SqliteStore};

use crate::error::Result;
use crate::types::DEFAULT_BUCKET;

/// A Shelf database handle.
///
/// The handle owns one connection to the backing store, the current
/// bucket, and at most one active transaction. The connection is opened
/// lazily by the first operation; in auto-close mode it is released again
/// after every operation (but never while a transaction is active).
///
/// # Example
///
/// ```ignore
/// use shelfdb::prelude::*;
///
/// let mut db = Shelf::builder().path("./shelf.db").open()?;
///
/// db.set("key", "value")?;
/// let value = db.get("key")?;
///
/// db.close()?;
/// ```
///
/// # Thread Safety
///
/// The current bucket and the transaction flag are unsynchronized session
/// state. A handle can move between threads but must not be shared;
/// concurrent callers each open their own handle.
pub struct Shelf<S: RowStore = SqliteStore> {
    store: S,
    bucket: String,
    auto_close: bool,
}

impl<S: RowStore> fmt::Debug for Shelf<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shelf")
            .field("bucket", &self.bucket)
            .field("auto_close", &self.auto_close)
            .finish_non_exhaustive()
    }
}

impl<S: RowStore> Shelf<S> {
    /// Wrap an existing row store in a handle.
    ///
    /// This is the entry point for custom [`RowStore`] implementations.
    /// The SQLite constructors below cover the common case.
    pub fn with_store(store: S, auto_close: bool) -> Self {
        Self {
            store,
            bucket: DEFAULT_BUCKET.to_string(),
            auto_close,
        }
    }

    // =========================================================================
    // Session state
    // =========================================================================

    /// Set the current bucket.
    ///
    /// All succeeding reads and writes on this handle resolve against the
    /// given bucket until it is changed again. An empty name means the
    /// default bucket.
    pub fn set_bucket(&mut self, bucket: impl Into<String>) {
        self.bucket = bucket.into();
    }

    /// The bucket that operations currently resolve to.
    pub fn bucket(&self) -> &str {
        effective_bucket(&self.bucket)
    }

    /// Whether the backing connection is currently open.
    pub fn is_open(&self) -> bool {
        self.store.is_open()
    }

    /// Whether a transaction is currently active on this handle.
    pub fn in_transaction(&self) -> bool {
        self.store.in_transaction()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the backing connection.
    ///
    /// No-op when already open. Every operation opens lazily, so calling
    /// this is only needed to surface connection problems early.
    pub fn open(&mut self) -> Result<()> {
        self.store.open()?;
        Ok(())
    }

    /// Close the backing connection.
    ///
    /// An active transaction is rolled back before the connection is
    /// released. No-op when already closed; the handle remains usable and
    /// reopens lazily.
    pub fn close(&mut self) -> Result<()> {
        self.store.close()?;
        Ok(())
    }

    // =========================================================================
    // Transaction scope
    // =========================================================================

    /// Begin a transaction.
    ///
    /// Opens the connection first if needed. While the transaction is
    /// active every operation on this handle executes inside it, and
    /// auto-close is suspended. Fails with [`Error::Transaction`] when a
    /// transaction is already active; nesting is not supported.
    ///
    /// [`Error::Transaction`]: crate::Error::Transaction
    pub fn begin(&mut self) -> Result<()> {
        self.store.open()?;
        self.store.begin()?;
        Ok(())
    }

    /// Commit the active transaction.
    ///
    /// Silent no-op success when no transaction is active: operations
    /// outside a transaction are unconditionally autonomous, and callers
    /// are not forced to guard their commit sites.
    pub fn commit(&mut self) -> Result<()> {
        self.store.commit()?;
        self.maybe_auto_close()?;
        Ok(())
    }

    /// Roll back the active transaction.
    ///
    /// Silent no-op success when no transaction is active, like
    /// [`commit`](Shelf::commit).
    pub fn rollback(&mut self) -> Result<()> {
        self.store.rollback()?;
        self.maybe_auto_close()?;
        Ok(())
    }

    // =========================================================================
    // Internals shared by the operation modules
    // =========================================================================

    /// Run one operation against the store: open lazily, execute, and in
    /// auto-close mode release the connection afterwards. Auto-close is
    /// skipped while a transaction is active, since closing would destroy
    /// the caller's scope.
    pub(crate) fn run<T>(
        &mut self,
        op: impl FnOnce(&mut S) -> shelf_store::Result<T>,
    ) -> Result<T> {
        self.store.open()?;
        let result = op(&mut self.store);
        match result {
            Ok(value) => {
                self.maybe_auto_close()?;
                Ok(value)
            }
            Err(e) => {
                // The operation error is the one the caller needs; a
                // close failure on this path is dropped.
                let _ = self.maybe_auto_close();
                Err(e.into())
            }
        }
    }

    /// The bucket operations resolve against, cloned for use inside
    /// [`run`](Shelf::run) closures.
    pub(crate) fn effective_bucket(&self) -> String {
        effective_bucket(&self.bucket).to_string()
    }

    fn maybe_auto_close(&mut self) -> Result<()> {
        if self.auto_close && !self.store.in_transaction() {
            self.store.close()?;
        }
        Ok(())
    }
}

/// Resolve the effective bucket for an operation: the session bucket, or
/// the default when unset.
fn effective_bucket(bucket: &str) -> &str {
    if bucket.is_empty() {
        DEFAULT_BUCKET
    } else {
        bucket
    }
}

// =============================================================================
// SQLite-backed constructors
// =============================================================================

impl Shelf<SqliteStore> {
    /// Create a handle for the given database path without connecting.
    ///
    /// The connection is established by the first operation, or by an
    /// explicit [`open`](Shelf::open). Auto-close is off; use
    /// [`Shelf::builder`] to turn it on or to connect eagerly.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_store(SqliteStore::new(path), false)
    }

    /// Create an ephemeral in-memory database.
    ///
    /// No files are created and all data is lost when the handle is
    /// dropped or closed. The connection is opened eagerly, since an
    /// in-memory database only exists while its connection does.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut db = Shelf::ephemeral()?;
    /// db.set("key", "value")?;
    /// drop(db); // data is gone
    /// ```
    pub fn ephemeral() -> Result<Self> {
        let mut db = Self::with_store(SqliteStore::in_memory(), false);
        db.store.open()?;
        Ok(db)
    }

    /// Create a builder for handle configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut db = Shelf::builder()
    ///     .path("./shelf.db")
    ///     .auto_close(true)
    ///     .build();
    /// ```
    pub fn builder() -> ShelfBuilder {
        ShelfBuilder::new()
    }
}

/// Builder for handle configuration.
///
/// # Example
///
/// ```ignore
/// // Long-lived handle holding its connection across operations
/// let mut db = Shelf::builder().path("./shelf.db").build();
///
/// // Open and close around every operation instead
/// let mut db = Shelf::builder().path("./shelf.db").auto_close(true).build();
/// ```
pub struct ShelfBuilder {
    path: Option<PathBuf>,
    auto_close: bool,
}

impl ShelfBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            path: None,
            auto_close: false,
        }
    }

    /// Set the database file path.
    ///
    /// When no path is given the handle uses an in-memory database. Note
    /// that auto-close mode empties an in-memory database after every
    /// operation; the combination is only useful in throwaway code.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Open and close the connection around each individual operation
    /// instead of holding it across the session.
    pub fn auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }

    /// Build the handle without connecting.
    ///
    /// The connection is established lazily by the first operation.
    pub fn build(self) -> Shelf<SqliteStore> {
        let store = match self.path {
            Some(path) => SqliteStore::new(path),
            None => SqliteStore::in_memory(),
        };
        Shelf::with_store(store, self.auto_close)
    }

    /// Build the handle and connect eagerly.
    pub fn open(self) -> Result<Shelf<SqliteStore>> {
        let mut db = self.build();
        db.store.open()?;
        Ok(db)
    }
}

impl Default for ShelfBuilder {
    fn default() -> Self {
        Self::new()
    }
}
