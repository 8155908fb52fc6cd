//! Persistent on-disk cache of geocoding results with a TTL.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;

const CACHE_FILENAME: &str = "geocode_cache.json";

/// Default TTL: 30 days. Addresses rarely move.
pub const GEOCODE_CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCoordinate {
    pub coordinate: Coordinate,
    /// Unix timestamp (seconds) when the entry was stored.
    pub cached_at: u64,
}

impl CachedCoordinate {
    fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: HashMap<String, CachedCoordinate>,
}

#[derive(Debug)]
pub struct GeocodeCache {
    path: PathBuf,
    ttl: Duration,
    file: CacheFile,
}

impl GeocodeCache {
    /// `<local data dir>/akiya-advisor/geocode_cache.json`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("akiya-advisor")
            .join(CACHE_FILENAME)
    }

    /// Load the cache at `path`, starting empty if it is missing or corrupt.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let path = path.into();
        let file = load_file(&path).unwrap_or_default();
        Self { path, ttl, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    /// Fresh entry for `query`, if any.
    pub fn get(&self, query: &str) -> Option<Coordinate> {
        let entry = self.file.entries.get(query)?;
        if entry.age() > self.ttl {
            tracing::debug!(query, "geocode cache entry expired");
            return None;
        }
        Some(entry.coordinate)
    }

    pub fn insert(&mut self, query: &str, coordinate: Coordinate) {
        self.file.entries.insert(
            query.to_string(),
            CachedCoordinate {
                coordinate,
                cached_at: unix_now(),
            },
        );
    }

    /// Drop expired entries and write the cache to disk.
    pub fn save(&mut self) -> Result<(), io::Error> {
        let ttl = self.ttl;
        self.file.entries.retain(|_, entry| entry.age() <= ttl);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.path, content)?;
        tracing::debug!(
            "saved geocode cache ({} entries) to {}",
            self.file.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn load_file(path: &Path) -> Option<CacheFile> {
    if !path.exists() {
        tracing::debug!("no geocode cache found at {}", path.display());
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(file) => {
                tracing::debug!("loaded geocode cache from {}", path.display());
                Some(file)
            }
            Err(e) => {
                tracing::warn!("failed to parse geocode cache: {e}");
                None
            }
        },
        Err(e) => {
            tracing::warn!("failed to read geocode cache: {e}");
            None
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
