//! Write-once JSON visa cache
//!
//! A flat JSON object keyed by normalized country name. Entries are written
//! once and never overwritten or expired within a process lifetime; a key
//! already present makes `put_if_absent` a no-op. Writes hold an exclusive
//! advisory lock on the cache file itself, so concurrent handles on the same
//! path, including ones in other processes, cannot lose or corrupt entries.

use crate::models::VisaInfo;
use crate::{Result, TripScoutError};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Normalize a country name into a cache key
pub fn normalize_country(name: &str) -> String {
    name.trim().to_lowercase()
}

/// On-disk write-once cache of extracted visa records
pub struct VisaCache {
    path: PathBuf,
}

impl VisaCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Look up a previously-extracted record. An unreadable or missing cache
    /// file behaves as a miss.
    pub fn get(&self, country: &str) -> Option<VisaInfo> {
        let file = File::open(&self.path).ok()?;
        FileExt::lock_shared(&file).ok()?;

        let mut body = String::new();
        (&file).read_to_string(&mut body).ok()?;

        let mut entries = self.parse_entries(&body);
        let hit = entries.remove(&normalize_country(country));
        if hit.is_some() {
            debug!(country, "visa cache hit");
        }
        hit
    }

    /// Store a record unless the key already exists. Returns whether the
    /// entry was written; an existing key leaves the file untouched.
    ///
    /// The whole load-insert-write runs under an exclusive file lock, so two
    /// handles racing on the same path cannot drop each other's keys.
    pub fn put_if_absent(&self, country: &str, info: &VisaInfo) -> Result<bool> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| TripScoutError::cache(format!("could not open visa cache: {e}")))?;
        FileExt::lock_exclusive(&file)
            .map_err(|e| TripScoutError::cache(format!("could not lock visa cache: {e}")))?;

        let mut body = String::new();
        (&file)
            .read_to_string(&mut body)
            .map_err(|e| TripScoutError::cache(format!("could not read visa cache: {e}")))?;
        let mut entries = self.parse_entries(&body);

        let key = normalize_country(country);
        if entries.contains_key(&key) {
            debug!(country, "visa cache already holds this country");
            return Ok(false);
        }

        entries.insert(key, info.clone());
        let body = serde_json::to_string_pretty(&entries)
            .map_err(|e| TripScoutError::cache(format!("could not serialize visa cache: {e}")))?;

        // Rewrite through the locked handle; the lock drops with the file
        file.set_len(0)
            .map_err(|e| TripScoutError::cache(format!("could not truncate visa cache: {e}")))?;
        (&file)
            .seek(SeekFrom::Start(0))
            .map_err(|e| TripScoutError::cache(format!("could not rewind visa cache: {e}")))?;
        (&file)
            .write_all(body.as_bytes())
            .map_err(|e| TripScoutError::cache(format!("could not write visa cache: {e}")))?;
        debug!(country, "visa cache entry written");
        Ok(true)
    }

    fn parse_entries(&self, body: &str) -> BTreeMap<String, VisaInfo> {
        if body.trim().is_empty() {
            return BTreeMap::new();
        }
        serde_json::from_str(body).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), %e, "visa cache unreadable, treating as empty");
            BTreeMap::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisaType;

    fn info(destination: &str, visa_type: VisaType) -> VisaInfo {
        let mut info = VisaInfo::unknown(destination, "India");
        info.visa_type = visa_type;
        info.confidence_level = 0.9;
        info
    }

    fn cache_in(dir: &tempfile::TempDir) -> VisaCache {
        VisaCache::new(dir.path().join("visa_cache.json"))
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        assert!(cache.get("Japan").is_none());
    }

    #[test]
    fn test_round_trip_with_normalized_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .put_if_absent("Japan", &info("Japan", VisaType::EVisa))
            .unwrap();

        let hit = cache.get("  JAPAN ").unwrap();
        assert_eq!(hit.visa_type, VisaType::EVisa);
    }

    #[test]
    fn test_existing_key_write_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visa_cache.json");
        let cache = VisaCache::new(&path);

        assert!(cache
            .put_if_absent("Japan", &info("Japan", VisaType::EVisa))
            .unwrap());
        let before = std::fs::read_to_string(&path).unwrap();

        // Second write for the same country must not disturb the file
        assert!(!cache
            .put_if_absent("japan", &info("Japan", VisaType::VisaRequired))
            .unwrap());
        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(before, after);
        assert_eq!(cache.get("Japan").unwrap().visa_type, VisaType::EVisa);
    }

    #[test]
    fn test_new_key_appends_without_disturbing_existing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .put_if_absent("Japan", &info("Japan", VisaType::EVisa))
            .unwrap();
        cache
            .put_if_absent("France", &info("France", VisaType::VisaRequired))
            .unwrap();

        assert_eq!(cache.get("Japan").unwrap().visa_type, VisaType::EVisa);
        assert_eq!(
            cache.get("France").unwrap().visa_type,
            VisaType::VisaRequired
        );
    }

    #[test]
    fn test_concurrent_handles_do_not_lose_writes() {
        let dir = tempfile::tempdir().unwrap();

        // Two independent handles on the same path racing on distinct keys;
        // neither write may be dropped, on any interleaving
        for round in 0..50 {
            let path = dir.path().join(format!("visa_cache_{round}.json"));

            let japan = std::thread::spawn({
                let path = path.clone();
                move || {
                    VisaCache::new(path)
                        .put_if_absent("Japan", &info("Japan", VisaType::EVisa))
                        .unwrap()
                }
            });
            let france = std::thread::spawn({
                let path = path.clone();
                move || {
                    VisaCache::new(path)
                        .put_if_absent("France", &info("France", VisaType::VisaRequired))
                        .unwrap()
                }
            });
            assert!(japan.join().unwrap());
            assert!(france.join().unwrap());

            let reread = VisaCache::new(&path);
            assert!(reread.get("Japan").is_some(), "round {round}: Japan lost");
            assert!(reread.get("France").is_some(), "round {round}: France lost");
        }
    }

    #[test]
    fn test_non_ascii_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visa_cache.json");
        let cache = VisaCache::new(&path);

        let mut record = info("Türkiye", VisaType::EVisa);
        record.special_notes = vec!["Geçerli pasaport gerekli".to_string()];
        cache.put_if_absent("Türkiye", &record).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("Türkiye"));
        assert!(body.contains("Geçerli"));
        assert_eq!(cache.get("türkiye").unwrap(), record);
    }

    #[test]
    fn test_corrupt_cache_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visa_cache.json");
        std::fs::write(&path, "not json at all").unwrap();

        let cache = VisaCache::new(&path);
        assert!(cache.get("Japan").is_none());
        assert!(cache
            .put_if_absent("Japan", &info("Japan", VisaType::EVisa))
            .unwrap());
    }
}
