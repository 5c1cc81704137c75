//! Read-through cache for the recent-courses list.
//!
//! The home screen shows the five most recently added courses. That list is
//! cached in device-local storage so a revisit renders without a round trip;
//! a miss or an undecodable entry falls back to the store and repopulates
//! the cache. Cache trouble never surfaces as an error, only as a fetch.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::fetch::{fetch_recent_courses, CatalogError, RECENT_COURSES_LIMIT};
use crate::model::CourseSummary;
use crate::store::DocumentStore;

/// Cache key under which the recent-courses list is stored.
pub const RECENT_COURSES_KEY: &str = "recentCourses";

/// Device-local string key-value storage.
///
/// Mirrors the platform storage helper: operations cannot fail from the
/// caller's point of view; an implementation that hits trouble logs it and
/// behaves as a miss.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    async fn set(&self, key: &str, value: String);

    /// Removes `key`.
    async fn remove(&self, key: &str);
}

/// In-memory [`LocalCache`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => None,
        }
    }

    async fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }

    async fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// Returns the recent-courses list, preferring the local cache.
///
/// On a cache hit the stored JSON is decoded and returned without touching
/// the document store. A corrupt entry is dropped and refetched. After a
/// store fetch the cache is repopulated for the next visit.
pub async fn recent_courses(
    store: &dyn DocumentStore,
    cache: &dyn LocalCache,
) -> Result<Vec<CourseSummary>, CatalogError> {
    if let Some(raw) = cache.get(RECENT_COURSES_KEY).await {
        match serde_json::from_str::<Vec<CourseSummary>>(&raw) {
            Ok(list) => {
                debug!(courses = list.len(), "recent courses served from cache");
                return Ok(list);
            }
            Err(e) => {
                warn!(error = %e, "dropping undecodable recent-courses cache entry");
                cache.remove(RECENT_COURSES_KEY).await;
            }
        }
    }

    let list = fetch_recent_courses(store, RECENT_COURSES_LIMIT).await?;
    match serde_json::to_string(&list) {
        Ok(raw) => cache.set(RECENT_COURSES_KEY, raw).await,
        Err(e) => warn!(error = %e, "recent courses not cached"),
    }
    Ok(list)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::{DocPath, MemoryStore};

    async fn store_with_courses(ids: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for (i, id) in ids.iter().enumerate() {
            store
                .write(
                    &DocPath::course(id),
                    json!({
                        "courseName": id,
                        "addedDate": format!("2024-03-0{}T00:00:00Z", i + 1)
                    }),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates_cache() {
        let store = store_with_courses(&["a", "b"]).await;
        let cache = MemoryCache::new();

        let list = recent_courses(&store, &cache).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "b");

        let raw = cache.get(RECENT_COURSES_KEY).await.unwrap();
        let cached: Vec<CourseSummary> = serde_json::from_str(&raw).unwrap();
        assert_eq!(cached, list);
    }

    #[tokio::test]
    async fn test_hit_skips_the_store() {
        let store = MemoryStore::new(); // would return nothing
        let cache = MemoryCache::new();
        let seeded = vec![CourseSummary {
            id: "cached".to_string(),
            course_name: "Cached Course".to_string(),
            thumbnail_url: String::new(),
            added_date: None,
        }];
        cache
            .set(
                RECENT_COURSES_KEY,
                serde_json::to_string(&seeded).unwrap(),
            )
            .await;

        let list = recent_courses(&store, &cache).await.unwrap();
        assert_eq!(list, seeded);
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_back_to_store() {
        let store = store_with_courses(&["a"]).await;
        let cache = MemoryCache::new();
        cache
            .set(RECENT_COURSES_KEY, "not json".to_string())
            .await;

        let list = recent_courses(&store, &cache).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "a");

        // The corrupt entry was replaced with a good one.
        let raw = cache.get(RECENT_COURSES_KEY).await.unwrap();
        assert!(serde_json::from_str::<Vec<CourseSummary>>(&raw).is_ok());
    }

    #[tokio::test]
    async fn test_recent_list_is_capped() {
        let store = store_with_courses(&["a", "b", "c", "d", "e", "f"]).await;
        let cache = MemoryCache::new();
        let list = recent_courses(&store, &cache).await.unwrap();
        assert_eq!(list.len(), RECENT_COURSES_LIMIT);
        assert_eq!(list[0].id, "f");
    }
}
