//! Public constants for the Shelf API.

/// Maximum length of a bucket name, in bytes.
pub const MAX_BUCKET_LEN: usize = 50;

/// Maximum length of a key, in bytes.
pub const MAX_KEY_LEN: usize = 300;

/// Maximum length of a value, in bytes.
pub const MAX_VALUE_LEN: usize = 16_777_215;

/// Bucket used when the session bucket is unset or empty.
pub const DEFAULT_BUCKET: &str = "default";

/// Mime string reported for keys with no mime record.
pub const DEFAULT_MIME: &str = "text/html";

/// Reserved key prefix under which tally counters are stored.
///
/// Tallies live in the same bucket as ordinary records, so their keys
/// show up in [`Shelf::list_keys`](crate::Shelf::list_keys) results.
/// Filter on this prefix to tell them apart.
pub const TALLY_PREFIX: &str = "_______#tally-";
