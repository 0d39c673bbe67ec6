//! Row-store layer for shelfdb
//!
//! This crate defines the transactional row-store contract the KV facade
//! is built against, and ships the SQLite implementation of it:
//! - `RowStore`: open/close, begin/commit/rollback, and row primitives
//!   over the two logical tables (records and mime types)
//! - `SqliteStore`: rusqlite-backed implementation with idempotent schema
//!   creation and atomic counter statements
//! - `StoreError`: adapter-level error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod row;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use row::RowStore;
pub use sqlite::SqliteStore;
