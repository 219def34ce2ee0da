//! TTL Cache
//!
//! In-memory map from key to (value, recorded_at, ttl). Expired entries are
//! evicted lazily when read; `cleanup` purges everything that has expired.
//! Values are type-erased so one instance serves every store.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::Clock;

/// Default lifetime of an entry (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    value: Rc<dyn Any>,
    recorded_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (now - self.recorded_at).to_std() {
            Ok(age) => age > self.ttl,
            // recorded in the future (clock went backwards): still fresh
            Err(_) => false,
        }
    }
}

pub struct TtlCache {
    entries: RefCell<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    clock: Rc<dyn Clock>,
}

impl TtlCache {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self::with_default_ttl(clock, DEFAULT_TTL)
    }

    pub fn with_default_ttl(clock: Rc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            default_ttl,
            clock,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store `value` under `key`, stamped with the current time
    pub fn set<T: Any>(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let entry = CacheEntry {
            value: Rc::new(value),
            recorded_at: self.clock.now(),
            ttl,
        };
        self.entries.borrow_mut().insert(key.into(), entry);
    }

    /// Store with the default TTL
    pub fn set_default<T: Any>(&self, key: impl Into<String>, value: T) {
        self.set(key, value, self.default_ttl);
    }

    /// Live value for `key`, or `None` (expired entries are removed).
    /// A value stored under a different type also reads as `None`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.borrow_mut();
        let expired = entries.get(key)?.is_expired(now);
        if expired {
            entries.remove(key);
            log::debug!("cache entry {} expired", key);
            return None;
        }
        entries.get(key)?.value.downcast_ref::<T>().cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.borrow_mut();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn delete(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Purge every expired entry
    pub fn cleanup(&self) {
        let now = self.clock.now();
        self.entries.borrow_mut().retain(|_, entry| !entry.is_expired(now));
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.cleanup();
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key builders
pub mod cache_keys {
    pub fn tasks(user_id: &str) -> String {
        format!("tasks:{}", user_id)
    }

    pub fn notes(user_id: &str) -> String {
        format!("notes:{}", user_id)
    }

    pub fn note(user_id: &str, note_id: &str) -> String {
        format!("note:{}:{}", user_id, note_id)
    }

    pub fn rpa_processes(user_id: &str) -> String {
        format!("rpa-processes:{}", user_id)
    }

    pub fn user_profile(user_id: &str) -> String {
        format!("user-profile:{}", user_id)
    }

    pub fn task_stats(user_id: &str) -> String {
        format!("task-stats:{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::manual::ManualClock;

    fn setup() -> (Rc<ManualClock>, TtlCache) {
        let clock = Rc::new(ManualClock::new());
        let cache = TtlCache::new(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_get_within_ttl() {
        let (clock, cache) = setup();
        cache.set("tasks:u1", vec![1, 2, 3], Duration::from_secs(60));

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get::<Vec<i32>>("tasks:u1"), Some(vec![1, 2, 3]));
        assert!(cache.contains("tasks:u1"));
    }

    #[test]
    fn test_expired_entry_is_purged_on_read() {
        let (clock, cache) = setup();
        cache.set("tasks:u1", vec![1], Duration::from_secs(60));

        clock.advance(Duration::from_secs(61));
        assert_eq!(cache.get::<Vec<i32>>("tasks:u1"), None);
        // gone from the map, not just hidden
        assert_eq!(cache.entries.borrow().len(), 0);
    }

    #[test]
    fn test_exactly_ttl_is_still_live() {
        let (clock, cache) = setup();
        cache.set("k", 7u8, Duration::from_secs(10));
        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get::<u8>("k"), Some(7));
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let (_clock, cache) = setup();
        cache.set_default("notes:u1", String::from("text"));
        assert_eq!(cache.get::<Vec<i32>>("notes:u1"), None);
        assert_eq!(cache.get::<String>("notes:u1"), Some("text".to_string()));
    }

    #[test]
    fn test_cleanup_and_len() {
        let (clock, cache) = setup();
        cache.set("short", 1, Duration::from_secs(5));
        cache.set("long", 2, Duration::from_secs(500));
        assert_eq!(cache.len(), 2);

        clock.advance(Duration::from_secs(6));
        cache.cleanup();
        assert_eq!(cache.entries.borrow().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let (_clock, cache) = setup();
        cache.set_default("a", 1);
        cache.set_default("b", 2);
        cache.delete("a");
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_builders() {
        assert_eq!(cache_keys::tasks("u1"), "tasks:u1");
        assert_eq!(cache_keys::rpa_processes("u1"), "rpa-processes:u1");
        assert_eq!(cache_keys::note("u1", "n9"), "note:u1:n9");
    }
}
