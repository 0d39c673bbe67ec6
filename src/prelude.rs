//! Convenient imports for Shelf.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```ignore
//! use shelfdb::prelude::*;
//!
//! let mut db = Shelf::builder().path("./shelf.db").open()?;
//! db.set("key", "value")?;
//! ```

// Main entry point
pub use crate::database::{Shelf, ShelfBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Limits and reserved names
pub use crate::types::{
    DEFAULT_BUCKET, DEFAULT_MIME, MAX_BUCKET_LEN, MAX_KEY_LEN, MAX_VALUE_LEN, TALLY_PREFIX,
};

// Row-store seam
pub use shelf_store::{RowStore, SqliteStore};
