use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

/// Bounded set of revoked token digests.
///
/// Two independent expiry mechanisms: an entry dies when the token it
/// revokes would have expired anyway (per-entry TTL), and the oldest
/// inserted entry is evicted when the cache is full, whatever its
/// remaining TTL. Under sustained overflow a long-lived revoked token can
/// therefore be forgotten before its natural expiry; that is the accepted
/// tradeoff for a single-node, memory-bounded cache instead of a durable
/// revocation list.
///
/// All synchronization is internal; callers never lock.
pub struct RevocationCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

struct Inner {
    entries: HashMap<String, DateTime<Utc>>,
    insertion_order: VecDeque<String>,
}

impl RevocationCache {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
        }
    }

    /// Remember `digest` as revoked until `expires_at`. An entry never
    /// outlives the token it revokes, so callers pass the token's own
    /// expiry, not the full configured lifetime.
    pub fn insert(&self, digest: String, expires_at: DateTime<Utc>, now: DateTime<Utc>) {
        if expires_at <= now {
            debug!("Skipping revocation entry for an already-expired token");
            return;
        }

        let mut inner = self.inner.lock().unwrap();

        // Entries whose token has expired are dead weight; drop them before
        // applying the capacity bound.
        inner.entries.retain(|_, exp| *exp > now);

        while inner.entries.len() >= self.capacity {
            match inner.insertion_order.pop_front() {
                Some(oldest) => {
                    if inner.entries.remove(&oldest).is_some() {
                        debug!("Revocation cache full, evicted oldest entry");
                    }
                    // Keys already purged above just fall through.
                }
                None => break,
            }
        }

        if inner.entries.insert(digest.clone(), expires_at).is_none() {
            inner.insertion_order.push_back(digest);
        }
    }

    /// O(1) membership probe. Entries past their expiry are dropped lazily
    /// here rather than by a background sweeper.
    pub fn contains(&self, digest: &str, now: DateTime<Utc>) -> bool {
        let mut inner = self.inner.lock().unwrap();

        let expired = match inner.entries.get(digest) {
            Some(exp) if *exp > now => return true,
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(digest);
        }

        false
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn entry_visible_until_token_expiry() {
        let cache = RevocationCache::new(10);
        let now = t0();

        cache.insert("abc".to_string(), now + Duration::minutes(30), now);

        assert!(cache.contains("abc", now));
        assert!(cache.contains("abc", now + Duration::minutes(29)));
        assert!(!cache.contains("abc", now + Duration::minutes(30)));
        // The lazy drop removed the dead entry.
        assert!(cache.is_empty());
    }

    #[test]
    fn entry_for_expired_token_is_not_stored() {
        let cache = RevocationCache::new(10);
        let now = t0();

        cache.insert("abc".to_string(), now - Duration::seconds(1), now);

        assert!(cache.is_empty());
    }

    #[test]
    fn overflow_evicts_oldest_inserted_regardless_of_ttl() {
        let cache = RevocationCache::new(2);
        let now = t0();
        let far = now + Duration::hours(10);

        // "first" has the longest remaining TTL but is still evicted first.
        cache.insert("first".to_string(), far, now);
        cache.insert("second".to_string(), now + Duration::minutes(5), now);
        cache.insert("third".to_string(), now + Duration::minutes(5), now);

        assert!(!cache.contains("first", now));
        assert!(cache.contains("second", now));
        assert!(cache.contains("third", now));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn expired_entries_are_purged_before_capacity_eviction() {
        let cache = RevocationCache::new(2);
        let now = t0();

        cache.insert("dying".to_string(), now + Duration::minutes(1), now);
        cache.insert("alive".to_string(), now + Duration::hours(1), now);

        // By the time the third entry arrives, "dying" is already past its
        // expiry, so "alive" survives the capacity check.
        let later = now + Duration::minutes(2);
        cache.insert("fresh".to_string(), later + Duration::hours(1), later);

        assert!(cache.contains("alive", later));
        assert!(cache.contains("fresh", later));
    }

    #[test]
    fn reinserting_same_digest_does_not_double_count() {
        let cache = RevocationCache::new(2);
        let now = t0();

        cache.insert("abc".to_string(), now + Duration::minutes(5), now);
        cache.insert("abc".to_string(), now + Duration::minutes(10), now);
        cache.insert("def".to_string(), now + Duration::minutes(5), now);

        // Both fit: the duplicate insert updated the expiry in place.
        assert!(cache.contains("abc", now + Duration::minutes(7)));
        assert!(cache.contains("def", now));
        assert_eq!(cache.len(), 2);
    }
}
