//! Session-scoped key/value cache.
//!
//! Views that memoize upstream results take a `SessionCache` instead of reaching for
//! global state. Each reader session gets its own cache from the `SessionStore`,
//! so one reader's cached results are never served to another.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

/// Request header carrying the reader's session id.
pub const SESSION_HEADER: &str = "x-zine-session";

/// Sessions kept before the oldest one is forgotten.
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

const MAX_SESSION_ID_LENGTH: usize = 128;

/// String key/value store with session-storage semantics.
pub trait SessionCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// Process-local cache backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// One `MemoryCache` per reader session, bounded by insertion order.
#[derive(Debug)]
pub struct SessionStore {
    capacity: usize,
    sessions: RwLock<Sessions>,
}

#[derive(Debug, Default)]
struct Sessions {
    caches: HashMap<String, Arc<MemoryCache>>,
    order: VecDeque<String>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            sessions: RwLock::new(Sessions::default()),
        }
    }

    /// The cache for `session_id`, or a throwaway one when the id is missing or unusable.
    pub fn cache_for(&self, session_id: Option<&str>) -> Arc<dyn SessionCache> {
        let Some(id) = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_SESSION_ID_LENGTH)
        else {
            return Arc::new(MemoryCache::new());
        };

        if let Some(cache) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .caches
            .get(id)
        {
            return cache.clone();
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cache) = sessions.caches.get(id) {
            return cache.clone();
        }
        while sessions.order.len() >= self.capacity {
            let Some(oldest) = sessions.order.pop_front() else {
                break;
            };
            sessions.caches.remove(&oldest);
            tracing::debug!("Forgot session cache {}", oldest);
        }

        let cache = Arc::new(MemoryCache::new());
        sessions.caches.insert(id.to_string(), cache.clone());
        sessions.order.push_back(id.to_string());
        cache
    }
}
