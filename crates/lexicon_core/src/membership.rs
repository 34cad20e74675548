//! In-memory LRU cache of each user's learned-word set, with TTL.
//! Key: user id. Entries expire after `ttl` and are dropped eagerly by
//! `invalidate` whenever the user's learned words change.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

struct CacheEntry {
    words: Arc<HashSet<String>>,
    inserted_at: Instant,
}

struct Inner {
    entries: LruCache<Uuid, CacheEntry>,
    /// Bumped on every invalidation. A load that started in an older epoch
    /// must not repopulate the cache.
    epoch: u64,
}

pub struct MembershipCache {
    inner: Mutex<Inner>,
    ttl: Duration,
}

impl MembershipCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                epoch: 0,
            }),
            ttl,
        }
    }

    /// Look up a user's learned set. Returns None if absent or expired.
    pub fn get(&self, user_id: Uuid) -> Option<Arc<HashSet<String>>> {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.get(&user_id) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(Arc::clone(&entry.words));
            }
            // Expired
            inner.entries.pop(&user_id);
        }
        None
    }

    /// Epoch to pass to [`Self::insert`] once the backing store has been read.
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Caches `words` for `user_id` unless an invalidation happened since
    /// `loaded_in_epoch` was taken. The set is returned either way.
    pub fn insert(
        &self,
        user_id: Uuid,
        words: HashSet<String>,
        loaded_in_epoch: u64,
    ) -> Arc<HashSet<String>> {
        let words = Arc::new(words);
        let mut inner = self.inner.lock();
        if inner.epoch == loaded_in_epoch {
            inner.entries.put(
                user_id,
                CacheEntry {
                    words: Arc::clone(&words),
                    inserted_at: Instant::now(),
                },
            );
        } else {
            debug!(%user_id, "discarding learned-word set loaded before an invalidation");
        }
        words
    }

    pub fn invalidate(&self, user_id: Uuid) {
        let mut inner = self.inner.lock();
        inner.epoch = inner.epoch.wrapping_add(1);
        inner.entries.pop(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> HashSet<String> {
        items.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn insert_then_get() {
        let cache = MembershipCache::new(8, Duration::from_secs(60));
        let user = Uuid::new_v4();
        cache.insert(user, words(&["apple"]), cache.epoch());

        let cached = cache.get(user).unwrap();
        assert!(cached.contains("apple"));
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = MembershipCache::new(8, Duration::ZERO);
        let user = Uuid::new_v4();
        cache.insert(user, words(&["apple"]), cache.epoch());
        assert!(cache.get(user).is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = MembershipCache::new(8, Duration::from_secs(60));
        let user = Uuid::new_v4();
        cache.insert(user, words(&["apple"]), cache.epoch());
        cache.invalidate(user);
        assert!(cache.get(user).is_none());
    }

    #[test]
    fn load_started_before_invalidation_is_not_cached() {
        let cache = MembershipCache::new(8, Duration::from_secs(60));
        let user = Uuid::new_v4();

        let epoch = cache.epoch();
        cache.invalidate(user);
        let returned = cache.insert(user, words(&[]), epoch);

        assert!(returned.is_empty());
        assert!(cache.get(user).is_none());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = MembershipCache::new(1, Duration::from_secs(60));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        cache.insert(a, words(&["x"]), cache.epoch());
        cache.insert(b, words(&["y"]), cache.epoch());
        assert!(cache.get(a).is_none());
        assert!(cache.get(b).is_some());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = MembershipCache::new(0, Duration::from_secs(60));
        let user = Uuid::new_v4();
        cache.insert(user, words(&["x"]), cache.epoch());
        assert!(cache.get(user).is_some());
    }
}
