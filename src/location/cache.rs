//! File-based cache of the last known region at ~/.nearby/last_region.json.
//!
//! A single `{region, timestamp}` blob. TTL: 30 minutes. An expired blob is
//! deleted the first time it is read. I/O failures are logged and otherwise
//! ignored; the cache is an optimization only.

use super::types::Region;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_TTL_MS: i64 = 30 * 60 * 1000; // 30 minutes in ms

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedRegion {
    region: Region,
    timestamp: i64,
}

/// The region cache.
pub struct RegionCache {
    path: PathBuf,
}

impl RegionCache {
    /// Cache at the default location (~/.nearby/last_region.json).
    pub fn load() -> Self {
        Self { path: Self::default_path() }
    }

    /// Cache at a specific path.
    pub fn load_from(path: PathBuf) -> Self {
        Self { path }
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nearby")
            .join("last_region.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<CachedRegion> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable region cache");
                None
            }
        }
    }

    /// The cached region, if present and younger than the TTL.
    pub fn get(&self) -> Option<Region> {
        self.get_at(chrono::Utc::now().timestamp_millis())
    }

    /// [`get`](Self::get) evaluated at `now_ms` (Unix epoch milliseconds).
    pub fn get_at(&self, now_ms: i64) -> Option<Region> {
        let entry = self.read()?;
        if now_ms - entry.timestamp < CACHE_TTL_MS {
            return Some(entry.region);
        }
        tracing::debug!(age_ms = now_ms - entry.timestamp, "region cache expired");
        self.clear();
        None
    }

    /// Store `region` stamped with the current time.
    pub fn put(&self, region: &Region) {
        self.put_at(region, chrono::Utc::now().timestamp_millis());
    }

    pub fn put_at(&self, region: &Region, timestamp_ms: i64) {
        let entry = CachedRegion { region: *region, timestamp: timestamp_ms };
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let written = serde_json::to_string_pretty(&entry)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&self.path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to cache region");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clear region cache");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cache() -> (RegionCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_region.json");
        (RegionCache::load_from(path), dir)
    }

    fn oakland() -> Region {
        Region {
            latitude: 37.8044,
            longitude: -122.2712,
            latitude_delta: 0.0922,
            longitude_delta: 0.0421,
        }
    }

    #[test]
    fn test_cache_put_get() {
        let (cache, _dir) = test_cache();
        cache.put(&oakland());
        assert_eq!(cache.get(), Some(oakland()));
    }

    #[test]
    fn test_cache_miss() {
        let (cache, _dir) = test_cache();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_cache_fresh_just_inside_ttl() {
        let (cache, _dir) = test_cache();
        cache.put_at(&oakland(), 1_000);
        assert!(cache.get_at(1_000 + CACHE_TTL_MS - 1).is_some());
    }

    #[test]
    fn test_cache_expired_is_removed() {
        let (cache, _dir) = test_cache();
        cache.put_at(&oakland(), 1_000);
        assert!(cache.get_at(1_000 + CACHE_TTL_MS).is_none());
        assert!(!cache.path().exists());
    }

    #[test]
    fn test_cache_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("last_region.json");

        RegionCache::load_from(path.clone()).put(&oakland());

        let cache2 = RegionCache::load_from(path);
        assert_eq!(cache2.get(), Some(oakland()));
    }

    #[test]
    fn test_cache_corrupt_file_ignored() {
        let (cache, _dir) = test_cache();
        fs::write(cache.path(), "{not json").unwrap();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_cache_clear() {
        let (cache, _dir) = test_cache();
        cache.put(&oakland());
        cache.clear();
        assert!(cache.get().is_none());
        // Clearing twice is harmless.
        cache.clear();
    }
}
