//! Metadata cache.
//!
//! Maps filename stems to resolved [`MediaDetails`] so a file is looked up
//! at most once. Entries never expire; the cache is only emptied by
//! [`MetadataCache::clear`].

use crate::models::media::MediaDetails;
use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Cache file name inside the config directory.
pub const CACHE_FILE: &str = "media_cache.json";

/// Persisted stem to metadata map.
#[derive(Debug, Clone, Default)]
pub struct MetadataCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, MediaDetails>,
}

impl MetadataCache {
    /// Empty cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache from `path`; a missing or corrupt file yields an empty cache.
    pub fn load(path: &Path) -> Self {
        let entries = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(crate::Error::from)
                .and_then(|content| serde_json::from_str(&content).map_err(crate::Error::from))
            {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Failed to load metadata cache from {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Loaded {} cached entries", entries.len());
        Self {
            path: Some(path.to_path_buf()),
            entries,
        }
    }

    /// Cached details for a stem.
    pub fn get(&self, stem: &str) -> Option<&MediaDetails> {
        self.entries.get(stem)
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.entries.contains_key(stem)
    }

    pub fn insert(&mut self, stem: impl Into<String>, details: MediaDetails) {
        self.entries.insert(stem.into(), details);
    }

    /// Rewrite the cache file with every entry.
    pub fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        tracing::info!("Saved {} cache entries to {:?}", self.entries.len(), path);
        Ok(())
    }

    /// Drop every entry and persist the empty cache.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in stem order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MediaDetails)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::MediaKind;
    use tempfile::TempDir;

    fn details(title: &str) -> MediaDetails {
        MediaDetails {
            title: title.to_string(),
            year: Some("2009".to_string()),
            genres: vec!["Animation".to_string()],
            kind: MediaKind::Movie,
            content_rating: Some("PG".to_string()),
        }
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CACHE_FILE);

        let mut cache = MetadataCache::load(&path);
        assert!(cache.is_empty());
        cache.insert("Up.2009.1080p", details("Up"));
        cache.save().unwrap();

        let reloaded = MetadataCache::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("Up.2009.1080p").unwrap().title, "Up");
    }

    #[test]
    fn test_corrupt_file_yields_empty_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CACHE_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let cache = MetadataCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CACHE_FILE);

        let mut cache = MetadataCache::load(&path);
        cache.insert("a", details("A"));
        cache.save().unwrap();
        cache.clear().unwrap();

        assert!(MetadataCache::load(&path).is_empty());
    }
}
