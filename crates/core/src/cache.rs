//! Naming and expiry rules for cached transcripts.

use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime};

/// How long a cached transcript stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Extension of cache entries; only these files are ever pruned.
pub const CACHE_EXTENSION: &str = "txt";

/// File name of the cache entry for a source URL.
pub fn cache_key(url: &str) -> String {
    format!("{:x}.{CACHE_EXTENSION}", Sha256::digest(url.as_bytes()))
}

/// Whether an entry last modified at `modified` is past its TTL at `now`.
pub fn is_expired(modified: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    match now.checked_sub(ttl) {
        Some(threshold) => modified < threshold,
        None => false,
    }
}
