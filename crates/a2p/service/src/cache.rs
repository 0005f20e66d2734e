//! Caller-owned context cache for framework adapters.
//!
//! Nothing in the service reads through this cache; an adapter that wants
//! to avoid re-evaluating on every turn owns one and decides when to
//! invalidate it.

use std::collections::HashMap;
use std::hash::Hash;

use a2p_types::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};

struct Slot<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

pub struct ContextCache<K, V, C = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: HashMap<K, Slot<V>>,
}

impl<K, V> ContextCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Cache on the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K, V, C> ContextCache<K, V, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Clock,
{
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: HashMap::new(),
        }
    }

    /// Fresh value for `key`, if any. Stale entries are dropped on access.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let fresh = self
            .entries
            .get(key)
            .map(|slot| now - slot.stored_at < self.ttl)?;
        if !fresh {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|slot| slot.value.clone())
    }

    /// Store `value`, restarting its TTL.
    pub fn insert(&mut self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.entries.insert(key, Slot { value, stored_at });
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every stale entry, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, slot| now - slot.stored_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2p_types::FixedClock;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn entries_expire_after_ttl() {
        let clock = clock();
        let mut cache = ContextCache::with_clock(Duration::seconds(300), clock.clone());
        cache.insert("agent-a", vec!["a2p:preferences".to_string()]);

        clock.advance(Duration::seconds(299));
        assert_eq!(cache.get(&"agent-a"), Some(vec!["a2p:preferences".to_string()]));

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get(&"agent-a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn purge_and_invalidate() {
        let clock = clock();
        let mut cache = ContextCache::with_clock(Duration::seconds(60), clock.clone());
        cache.insert(1, "old");
        clock.advance(Duration::seconds(61));
        cache.insert(2, "new");

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate(&2));
        assert!(!cache.invalidate(&2));
    }

    #[test]
    fn system_clock_cache_serves_fresh_values() {
        let mut cache: ContextCache<String, u32> = ContextCache::new(Duration::minutes(5));
        cache.insert("k".into(), 7);
        assert_eq!(cache.get(&"k".to_string()), Some(7));
        cache.clear();
        assert!(cache.get(&"k".to_string()).is_none());
    }
}
