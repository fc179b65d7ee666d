//! File-based geocode cache at ~/.foreclosure_atlas/geocode_cache.json.
//!
//! TTL: 30 days. Keys are [`SearchQuery::cache_key`] strings, so lookups are
//! case-insensitive. Only successful lookups are stored; a miss is always
//! retried on the next run.

use super::providers::SearchQuery;
use super::types::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CACHE_TTL_MS: i64 = 30 * 24 * 3600 * 1000;

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    timestamp: i64,
    #[serde(default)]
    display_name: Option<String>,
}

/// The geocode cache.
pub struct GeocodeCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl GeocodeCache {
    /// Load the cache from a specific path. A missing or corrupt file yields
    /// an empty cache.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        debug!(path = %path.display(), entries = entries.len(), "loaded geocode cache");
        Self { path, entries }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".foreclosure_atlas")
            .join("geocode_cache.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Cached point for a query, unless missing or expired.
    pub fn get(&self, query: &SearchQuery) -> Option<GeoPoint> {
        let entry = self.entries.get(&query.cache_key())?;
        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > CACHE_TTL_MS {
            return None;
        }
        Some(GeoPoint::new(entry.lat, entry.lon))
    }

    /// Store a point and persist to disk.
    pub fn put(&mut self, query: &SearchQuery, point: GeoPoint, display_name: Option<&str>) {
        let entry = CacheEntry {
            lat: point.lat,
            lon: point.lon,
            timestamp: chrono::Utc::now().timestamp_millis(),
            display_name: display_name.map(str::to_string),
        };
        self.entries.insert(query.cache_key(), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    debug!(path = %self.path.display(), error = %e, "could not write geocode cache");
                }
            }
            Err(e) => debug!(error = %e, "could not serialize geocode cache"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
