//! Time-bounded memo of web point lookups, keyed by exact query text.
//!
//! Entries older than the TTL read as absent and are overwritten by the next
//! successful lookup; nothing is purged on a timer.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    points: Vec<String>,
}

/// Query → points cache with expiry.
#[derive(Debug)]
pub struct PointCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl PointCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Points stored for `query`, if still fresh.
    pub fn get(&self, query: &str) -> Option<Vec<String>> {
        self.get_at(query, Instant::now())
    }

    pub(crate) fn get_at(&self, query: &str, now: Instant) -> Option<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        match entries.get(query) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                tracing::debug!("Cache hit for web query: {}", query);
                Some(entry.points.clone())
            }
            Some(_) => {
                tracing::debug!("Cache entry expired for web query: {}", query);
                None
            }
            None => {
                tracing::debug!("Cache miss for web query: {}", query);
                None
            }
        }
    }

    pub fn insert(&self, query: &str, points: Vec<String>) {
        self.insert_at(query, points, Instant::now());
    }

    pub(crate) fn insert_at(&self, query: &str, points: Vec<String>, now: Instant) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.insert(
            query.to_string(),
            CacheEntry {
                stored_at: now,
                points,
            },
        );
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
