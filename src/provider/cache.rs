//! File-based response cache with per-category TTLs.
//!
//! Raw API responses are stored as JSON next to a timestamp so repeated
//! season scans don't hammer the rate-limited public API. The cache
//! directory is created on first write.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Cached payload with the time it was written.
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Cache categories with different TTLs.
#[derive(Debug, Clone, Copy)]
pub enum CacheCategory {
    /// Season calendars. Short-lived: events get rescheduled.
    Schedule,
    /// Race result sets. Long-lived: past results don't change.
    RaceResult,
}

impl CacheCategory {
    /// TTL for entries in this category.
    pub fn ttl(&self) -> Duration {
        match self {
            CacheCategory::Schedule => Duration::hours(12),
            CacheCategory::RaceResult => Duration::days(30),
        }
    }

    /// Subdirectory name for this category.
    pub fn dir_name(&self) -> &str {
        match self {
            CacheCategory::Schedule => "schedule",
            CacheCategory::RaceResult => "results",
        }
    }
}

/// File-based cache rooted at a base directory.
#[derive(Debug, Clone)]
pub struct Cache {
    base_dir: PathBuf,
}

impl Cache {
    /// Create a cache rooted at `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn cache_path(&self, category: CacheCategory, key: &str) -> PathBuf {
        self.base_dir
            .join(category.dir_name())
            .join(format!("{}.json", key))
    }

    /// Get cached data if present and within TTL.
    ///
    /// Unreadable or expired entries are treated as misses.
    pub fn get<T: DeserializeOwned>(&self, category: CacheCategory, key: &str) -> Option<T> {
        let path = self.cache_path(category, key);

        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to parse cache file {}: {}", path.display(), e);
                return None;
            }
        };

        if Utc::now() - entry.cached_at > category.ttl() {
            debug!("Cache expired for {}/{}", category.dir_name(), key);
            return None;
        }

        debug!("Cache hit for {}/{}", category.dir_name(), key);
        Some(entry.data)
    }

    /// Store data under a category and key.
    pub fn put<T: Serialize>(&self, category: CacheCategory, key: &str, data: &T) -> Result<()> {
        let path = self.cache_path(category, key);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory {}", parent.display()))?;
        }

        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };
        let content = serde_json::to_string(&entry)?;

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;

        debug!("Cached {}/{}", category.dir_name(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_path_buf());

        let value = json!({"round": 5, "name": "Monaco Grand Prix"});
        cache
            .put(CacheCategory::RaceResult, "results_2023_5", &value)
            .unwrap();

        let loaded: Option<serde_json::Value> =
            cache.get(CacheCategory::RaceResult, "results_2023_5");
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_path_buf());

        let loaded: Option<serde_json::Value> = cache.get(CacheCategory::Schedule, "nope");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_categories_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_path_buf());

        cache
            .put(CacheCategory::Schedule, "key", &json!(1))
            .unwrap();

        let other: Option<serde_json::Value> = cache.get(CacheCategory::RaceResult, "key");
        assert!(other.is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_path_buf());

        let path = dir.path().join("schedule").join("bad.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let loaded: Option<serde_json::Value> = cache.get(CacheCategory::Schedule, "bad");
        assert!(loaded.is_none());
    }
}
