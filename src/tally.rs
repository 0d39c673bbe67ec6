//! Tally counters.
//!
//! A tally is a named signed counter stored as an ordinary record in the
//! current bucket, under the reserved [`TALLY_PREFIX`] key prefix, with
//! its value encoded as decimal text. An absent record means the counter
//! is uninitialized, which is distinct from a counter at zero.
//!
//! Each operation is a single atomic statement at the row-store boundary,
//! so a read and its write-back can never interleave with another caller
//! on the same store.
//!
//! [`TALLY_PREFIX`]: crate::TALLY_PREFIX

use shelf_store::RowStore;

use crate::database::Shelf;
use crate::error::Result;
use crate::kv::{validate_bucket, validate_key};
use crate::types::TALLY_PREFIX;

impl<S: RowStore> Shelf<S> {
    /// Read a tally, initializing it first when it does not exist.
    ///
    /// A fresh counter is set to `offset` and `offset` is returned. Once
    /// initialized the stored value is returned unchanged, whatever
    /// `offset` says.
    ///
    /// # Example
    ///
    /// ```ignore
    /// assert_eq!(db.tally("visits", 100)?, 100); // created at 100
    /// assert_eq!(db.tally("visits", 5)?, 100);   // already initialized
    /// ```
    pub fn tally(&mut self, key: &str, offset: i64) -> Result<i64> {
        let bucket = self.effective_bucket();
        let tally_key = tally_key(key);
        validate_bucket(&bucket)?;
        validate_key(&tally_key)?;
        self.run(|store| store.counter_init_or_get(&bucket, &tally_key, offset))
    }

    /// Increment a tally and return the new value.
    ///
    /// An uninitialized counter behaves as zero, so the first increment
    /// returns 1.
    pub fn tally_incr(&mut self, key: &str) -> Result<i64> {
        self.tally_add(key, 1)
    }

    /// Decrement a tally and return the new value.
    ///
    /// An uninitialized counter behaves as zero, so the first decrement
    /// returns -1.
    pub fn tally_decr(&mut self, key: &str) -> Result<i64> {
        self.tally_add(key, -1)
    }

    /// Reset a tally to zero, whether or not it exists.
    ///
    /// This is a plain overwrite; it does not read the counter first.
    pub fn tally_reset(&mut self, key: &str) -> Result<()> {
        let bucket = self.effective_bucket();
        let tally_key = tally_key(key);
        validate_bucket(&bucket)?;
        validate_key(&tally_key)?;
        self.run(|store| store.upsert_row(&bucket, &tally_key, b"0"))
    }

    fn tally_add(&mut self, key: &str, delta: i64) -> Result<i64> {
        let bucket = self.effective_bucket();
        let tally_key = tally_key(key);
        validate_bucket(&bucket)?;
        validate_key(&tally_key)?;
        self.run(|store| store.counter_add(&bucket, &tally_key, delta))
    }
}

/// The record key a tally named `key` is stored under.
///
/// Key-length validation applies to this expanded key, not the caller's
/// name alone.
fn tally_key(key: &str) -> String {
    format!("{TALLY_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_key_uses_reserved_prefix() {
        assert_eq!(tally_key("visits"), "_______#tally-visits");
    }
}
