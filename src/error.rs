//! Unified error types for Shelf.
//!
//! This module provides the public error type that wraps adapter-level
//! errors and presents a consistent interface to users.

use shelf_store::StoreError;
use thiserror::Error;

/// All Shelf errors.
///
/// This is the canonical error type for all Shelf operations. Backend
/// errors surface here unchanged in meaning; nothing is retried
/// internally. Absence is never an error: `get` reports an empty value,
/// `get_mime` the default mime string, and `list_keys` an empty list.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store is unreachable or the descriptor is malformed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Bucket name exceeds the 50-byte limit. Checked before any write.
    #[error("bucket name too long: {len} bytes (limit 50)")]
    BucketTooLong {
        /// Length of the offending bucket name
        len: usize,
    },

    /// Key exceeds the 300-byte limit. Checked before any write.
    #[error("key too long: {len} bytes (limit 300)")]
    KeyTooLong {
        /// Length of the offending key
        len: usize,
    },

    /// Value exceeds the 16 MiB row limit. Checked before any write.
    #[error("value too large: {len} bytes (limit 16777215)")]
    ValueTooLarge {
        /// Length of the offending value
        len: usize,
    },

    /// A transaction could not be started, committed, or rolled back.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Any other backend failure during a read or write.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for Shelf operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a size-limit validation failure.
    ///
    /// Validation failures are checked before any write is performed, so
    /// the store is untouched when one is returned.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::BucketTooLong { .. } | Error::KeyTooLong { .. } | Error::ValueTooLarge { .. }
        )
    }

    /// Check if this is a connection-level error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a transaction-level error.
    pub fn is_transaction(&self) -> bool {
        matches!(self, Error::Transaction(_))
    }
}

// Convert from adapter-level errors
impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::Open { .. } | StoreError::NotOpen | StoreError::Close { .. } => {
                Error::Connection(message)
            }
            StoreError::AlreadyInTransaction | StoreError::Transaction { .. } => {
                Error::Transaction(message)
            }
            StoreError::Query { .. } | StoreError::Execute { .. } => Error::Storage(message),
        }
    }
}
