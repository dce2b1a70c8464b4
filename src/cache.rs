//! In-process TTL cache for read-heavy listings.
//!
//! The branch and employee listings are requested by every client screen,
//! so responses are kept in a small mutex-guarded map for a short TTL.
//! Writers invalidate by key prefix (e.g. everything under `employees:`)
//! rather than tracking individual keys.
//!
//! Deliberately not an external key-value store; a plain map behind a
//! mutex is enough for a handful of listing endpoints.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// Bound the map so a misbehaving client cannot grow it without limit.
const MAX_ENTRIES: usize = 256;

struct CacheEntry {
    data: Value,
    created_at: Instant,
}

/// TTL cache keyed by strings, storing rendered JSON responses.
pub struct ListingCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch a cached value if present and not expired.
    ///
    /// Uses `try_lock`: a contended cache behaves as a miss instead of
    /// stalling the request.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.try_lock().ok()?;
        let entry = entries.get(key)?;
        if entry.created_at.elapsed() < self.ttl {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    /// Store a value under `key`, evicting expired entries when full.
    pub fn put(&self, key: impl Into<String>, data: Value) {
        let Ok(mut entries) = self.entries.try_lock() else {
            return;
        };

        if entries.len() >= MAX_ENTRIES {
            let ttl = self.ttl;
            entries.retain(|_, e| e.created_at.elapsed() < ttl);
            // Still full of live entries: drop the write rather than grow.
            if entries.len() >= MAX_ENTRIES {
                return;
            }
        }

        entries.insert(
            key.into(),
            CacheEntry {
                data,
                created_at: Instant::now(),
            },
        );
    }

    /// Drop every entry whose key starts with `prefix`.
    ///
    /// Called by write handlers after a mutation so stale listings are
    /// never served past the write.
    pub fn invalidate_prefix(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|k, _| !k.starts_with(prefix));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_stored_value_within_ttl() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.put("branches:all", json!([{"name": "Damascus"}]));

        assert_eq!(
            cache.get("branches:all"),
            Some(json!([{"name": "Damascus"}]))
        );
        assert_eq!(cache.get("branches:other"), None);
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = ListingCache::new(Duration::ZERO);
        cache.put("branches:all", json!(1));

        assert_eq!(cache.get("branches:all"), None);
    }

    #[test]
    fn invalidate_prefix_drops_matching_keys_only() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.put("employees:all", json!(1));
        cache.put("employees:branch:abc", json!(2));
        cache.put("branches:all", json!(3));

        cache.invalidate_prefix("employees:");

        assert_eq!(cache.get("employees:all"), None);
        assert_eq!(cache.get("employees:branch:abc"), None);
        assert_eq!(cache.get("branches:all"), Some(json!(3)));
    }
}
