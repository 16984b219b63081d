//! Stable digests used for source keys, rendition keys and path sharding.

use sha2::{Digest, Sha256};

/// Joins the parts with `||` and returns the lowercase hex SHA-256 digest.
///
/// The output is 64 characters long and identical across processes, so it is
/// safe to embed in persisted paths and cache keys.
pub fn tokey<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            hasher.update(b"||");
        }
        hasher.update(part.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}
