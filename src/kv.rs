//! Bucketed key-value operations and the mime side-channel.
//!
//! All operations resolve against the handle's current bucket (default
//! `"default"`). Mime records are not bucket-scoped: one mime string is
//! kept per key string, in a dedicated table, so a bucket named like the
//! mime store cannot collide with it.

use shelf_store::RowStore;

use crate::database::Shelf;
use crate::error::{Error, Result};
use crate::types::{DEFAULT_MIME, MAX_BUCKET_LEN, MAX_KEY_LEN, MAX_VALUE_LEN};

impl<S: RowStore> Shelf<S> {
    /// Retrieve the value stored under a key in the current bucket.
    ///
    /// Returns an empty vec when the key is absent; absence is not an
    /// error. A zero-length value is legal, so an empty result does not
    /// distinguish "absent" from "present but empty". Callers that need
    /// the distinction can consult [`list_keys`](Shelf::list_keys).
    pub fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        let bucket = self.effective_bucket();
        let row = self.run(|store| store.get_row(&bucket, key))?;
        Ok(row.unwrap_or_default())
    }

    /// Create or update the record under a key in the current bucket.
    ///
    /// Size limits are checked before anything is written: buckets up to
    /// 50 bytes, keys up to 300, values up to 16,777,215.
    pub fn set(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<()> {
        let value = value.as_ref();
        let bucket = self.effective_bucket();
        validate(&bucket, key, value)?;
        self.run(|store| store.upsert_row(&bucket, key, value))
    }

    /// Retrieve the mime string recorded for a key.
    ///
    /// Returns `"text/html"` when no mime record exists or the recorded
    /// string is empty.
    pub fn get_mime(&mut self, key: &str) -> Result<String> {
        let mime = self.run(|store| store.get_mime_row(key))?;
        Ok(match mime {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_MIME.to_string(),
        })
    }

    /// Record the mime string for a key.
    ///
    /// Subject to the same size validation as [`set`](Shelf::set); the
    /// mime store is not bucket-scoped, so no bucket limit applies.
    pub fn set_mime(&mut self, key: &str, mime: &str) -> Result<()> {
        validate_key(key)?;
        validate_value(mime.as_bytes())?;
        self.run(|store| store.upsert_mime_row(key, mime))
    }

    /// Delete the record under a key in the current bucket, along with
    /// its mime record.
    ///
    /// Both deletes are issued even when the data record never existed.
    /// The two deletes are not atomic at this layer: if the second fails
    /// the first has already taken effect. Callers needing atomicity wrap
    /// the call in [`begin`](Shelf::begin)/[`commit`](Shelf::commit).
    pub fn del(&mut self, key: &str) -> Result<()> {
        let bucket = self.effective_bucket();
        self.run(|store| {
            store.delete_row(&bucket, key)?;
            store.delete_mime_row(key)
        })
    }

    /// List the keys in the current bucket that start with `pattern`.
    ///
    /// This is a literal prefix match, not a wildcard pattern; `%` and
    /// `_` in the pattern match themselves. Returns an empty vec when
    /// nothing matches. Order is backend-defined.
    pub fn list_keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let bucket = self.effective_bucket();
        self.run(|store| store.scan_prefix(&bucket, pattern))
    }
}

/// Check all three size limits, before any write is performed.
pub(crate) fn validate(bucket: &str, key: &str, value: &[u8]) -> Result<()> {
    validate_bucket(bucket)?;
    validate_key(key)?;
    validate_value(value)
}

pub(crate) fn validate_bucket(bucket: &str) -> Result<()> {
    if bucket.len() > MAX_BUCKET_LEN {
        return Err(Error::BucketTooLong { len: bucket.len() });
    }
    Ok(())
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(Error::KeyTooLong { len: key.len() });
    }
    Ok(())
}

fn validate_value(value: &[u8]) -> Result<()> {
    if value.len() > MAX_VALUE_LEN {
        return Err(Error::ValueTooLarge { len: value.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_enforces_each_limit() {
        assert!(validate("b", "k", b"v").is_ok());

        let long_bucket = "b".repeat(MAX_BUCKET_LEN + 1);
        assert!(matches!(
            validate(&long_bucket, "k", b"v"),
            Err(Error::BucketTooLong { len }) if len == MAX_BUCKET_LEN + 1
        ));

        let long_key = "k".repeat(MAX_KEY_LEN + 1);
        assert!(matches!(
            validate("b", &long_key, b"v"),
            Err(Error::KeyTooLong { len }) if len == MAX_KEY_LEN + 1
        ));
    }

    #[test]
    fn validate_accepts_boundary_lengths() {
        let bucket = "b".repeat(MAX_BUCKET_LEN);
        let key = "k".repeat(MAX_KEY_LEN);
        assert!(validate(&bucket, &key, b"v").is_ok());
    }
}
