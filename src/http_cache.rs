use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

// Idempotent read endpoints whose responses are safe to reuse for a while.
// Everything else always goes to the server.
const CACHEABLE_PATHS: &[&str] = &["/matches/fixtures", "/matches/statuses", "/groups/teams"];

pub fn is_cacheable_path(path: &str) -> bool {
    CACHEABLE_PATHS.iter().any(|p| path == *p)
}

pub fn cache_key(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let mut out = String::with_capacity(path.len() + 16 * query.len());
    out.push_str(path);
    out.push('?');
    for (idx, (name, value)) in query.iter().enumerate() {
        if idx > 0 {
            out.push('&');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(value);
    }
    out
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    fetched_at: DateTime<Utc>,
}

/// In-memory response cache. Entries live for `ttl` and die with the
/// process, the same lifetime the browser tab gave the original.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    clock: Clock,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl_secs: u64, clock: Clock) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let guard = self.entries.lock().expect("response cache lock poisoned");
        let entry = guard.get(key)?;
        if now - entry.fetched_at > self.ttl {
            return None;
        }
        Some(entry.body.clone())
    }

    pub fn put(&self, key: &str, body: String) {
        let entry = CacheEntry {
            body,
            fetched_at: self.clock.now(),
        };
        let mut guard = self.entries.lock().expect("response cache lock poisoned");
        guard.insert(key.to_string(), entry);
    }

    pub fn purge_expired(&self) {
        let now = self.clock.now();
        let mut guard = self.entries.lock().expect("response cache lock poisoned");
        guard.retain(|_, entry| now - entry.fetched_at <= self.ttl);
    }

    pub fn clear(&self) {
        let mut guard = self.entries.lock().expect("response cache lock poisoned");
        guard.clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("response cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
