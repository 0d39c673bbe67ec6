//! # Shelf
//!
//! Bucketed key-value store backed by a transactional relational table.
//!
//! Shelf partitions keys into named buckets, keeps an optional
//! content-type (mime) record per key, and provides named counters
//! ("tallies") with atomic read-or-create semantics. Multiple operations
//! can be batched into one atomic unit with an explicit transaction
//! scope.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shelfdb::prelude::*;
//!
//! // Open a database
//! let mut db = Shelf::builder().path("./shelf.db").open()?;
//!
//! // Key-value operations
//! db.set("user:1", "Alice")?;
//! let name = db.get("user:1")?;
//!
//! // Buckets partition the key space
//! db.set_bucket("sessions");
//! db.set("user:1", "token")?;
//!
//! // Counters
//! let visits = db.tally_incr("visits")?;
//!
//! // Graceful shutdown
//! db.close()?;
//! ```
//!
//! ## Transactions
//!
//! Operations outside a transaction are autonomous: each one commits on
//! its own. An explicit scope batches them:
//!
//! ```ignore
//! db.begin()?;
//! db.set("a", "1")?;
//! db.set("b", "2")?;
//! db.commit()?; // or db.rollback()?
//! ```
//!
//! ## Handles
//!
//! A [`Shelf`] is session state: it holds the current bucket, one lazily
//! opened connection, and at most one active transaction. It is not meant
//! to be shared between threads; concurrent callers open one handle each.

#![warn(missing_docs)]

mod database;
mod error;
mod kv;
mod tally;
mod types;

pub mod prelude;

// Re-export main entry points
pub use database::{Shelf, ShelfBuilder};
pub use error::{Error, Result};

// Re-export types and limits
pub use types::*;

// Re-export the row-store seam for custom backends
pub use shelf_store::{RowStore, SqliteStore, StoreError};
