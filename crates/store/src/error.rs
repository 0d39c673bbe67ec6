//! Adapter-level error type.
//!
//! `StoreError` carries the backend error where there is one. The facade
//! crate folds these into its public taxonomy; nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a row store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be opened.
    #[error("failed to open store at {path}: {source}")]
    Open {
        /// Descriptor the open was attempted with
        path: PathBuf,
        /// Underlying driver error
        source: rusqlite::Error,
    },

    /// An operation required an open connection and none was available.
    #[error("store is not open")]
    NotOpen,

    /// `begin` was called while a transaction was already active.
    #[error("a transaction is already active")]
    AlreadyInTransaction,

    /// A begin, commit, or rollback statement failed.
    #[error("transaction statement failed: {source}")]
    Transaction {
        /// Underlying driver error
        source: rusqlite::Error,
    },

    /// A read statement (get or scan) failed.
    #[error("query failed: {source}")]
    Query {
        /// Underlying driver error
        source: rusqlite::Error,
    },

    /// A write statement (upsert or delete) failed.
    #[error("statement failed: {source}")]
    Execute {
        /// Underlying driver error
        source: rusqlite::Error,
    },

    /// The connection could not be released cleanly.
    #[error("failed to close store: {source}")]
    Close {
        /// Underlying driver error
        source: rusqlite::Error,
    },
}

/// Result type for row store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
