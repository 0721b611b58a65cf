//! Read-through source cache
//!
//! Keeps parsed source files in memory across repeated analysis runs in the
//! same process, so an unchanged file is never parsed twice.
//!
//! # Cache Key
//! Entries are keyed by canonical path and record the file's modification
//! time, byte length and SHA-256 digest:
//! 1. Same (mtime, length) as the entry: hit, the file is not read
//! 2. Otherwise the file is read and hashed; an unchanged digest is still a
//!    hit and the entry's metadata is refreshed
//! 3. A changed digest re-parses and replaces the entry
//!
//! Callers invalidate explicitly with [`SourceCache::invalidate`] or
//! [`SourceCache::clear`].

use mems_common::{Error, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of a cached source, as reported alongside analysis results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    /// Lower-case hex SHA-256 of the file content
    pub sha256: String,
}

/// Cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CacheEntry<T> {
    modified: Option<SystemTime>,
    len: u64,
    sha256: String,
    value: Arc<T>,
}

/// Process-wide cache of parsed sources of one kind
pub struct SourceCache<T> {
    name: &'static str,
    entries: RwLock<HashMap<PathBuf, CacheEntry<T>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> SourceCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the parsed source at `path`, parsing with `parse` on a miss
    pub async fn get_or_load<F>(&self, path: &Path, parse: F) -> Result<Arc<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let key = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| io_error(path, e))?;
        let metadata = tokio::fs::metadata(&key)
            .await
            .map_err(|e| io_error(path, e))?;
        let modified = metadata.modified().ok();

        // Fast path: metadata unchanged
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(&key) {
                if modified.is_some() && entry.modified == modified && entry.len == metadata.len() {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(cache = self.name, path = %key.display(), "Source cache hit");
                    return Ok(Arc::clone(&entry.value));
                }
            }
        }

        let bytes = tokio::fs::read(&key).await.map_err(|e| io_error(path, e))?;
        let sha256 = format!("{:x}", Sha256::digest(&bytes));
        let len = bytes.len() as u64;

        // Content unchanged despite new metadata (e.g. file touched)
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get_mut(&key) {
                if entry.sha256 == sha256 {
                    entry.modified = modified;
                    entry.len = len;
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(cache = self.name, path = %key.display(), "Source cache hit (content unchanged)");
                    return Ok(Arc::clone(&entry.value));
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(parse(&bytes)?);

        info!(
            cache = self.name,
            path = %key.display(),
            bytes = len,
            "Loaded source"
        );

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                modified,
                len,
                sha256,
                value: Arc::clone(&value),
            },
        );

        Ok(value)
    }

    /// Drop the entry for `path`, returning whether one existed
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some();
        debug!(cache = self.name, path = %key.display(), removed, "Source cache invalidated");
        removed
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Fingerprint of the cached entry for `path`, if any
    pub async fn fingerprint(&self, path: &Path) -> Option<SourceFingerprint> {
        let key = tokio::fs::canonicalize(path).await.ok()?;
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&key).map(|entry| SourceFingerprint {
            path: key.clone(),
            len: entry.len,
            sha256: entry.sha256.clone(),
        })
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(path.display().to_string())
    } else {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse_text(bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::Parse(e.to_string()))
    }

    #[tokio::test]
    async fn test_second_load_is_a_hit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("source.txt");
        std::fs::write(&path, "first").unwrap();

        let cache = SourceCache::new("test");
        let a = cache.get_or_load(&path, parse_text).await.unwrap();
        let b = cache.get_or_load(&path, parse_text).await.unwrap();

        assert_eq!(a.as_str(), "first");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, entries: 1 });
    }

    #[tokio::test]
    async fn test_changed_content_is_reparsed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("source.txt");
        std::fs::write(&path, "first").unwrap();

        let cache = SourceCache::new("test");
        cache.get_or_load(&path, parse_text).await.unwrap();

        std::fs::write(&path, "second version").unwrap();
        let reloaded = cache.get_or_load(&path, parse_text).await.unwrap();

        assert_eq!(reloaded.as_str(), "second version");
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().entries, 1);
    }

    #[tokio::test]
    async fn test_rewrite_with_same_content_is_a_hit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("source.txt");
        std::fs::write(&path, "same").unwrap();

        let cache = SourceCache::new("test");
        cache.get_or_load(&path, parse_text).await.unwrap();
        std::fs::write(&path, "same").unwrap();
        cache.get_or_load(&path, parse_text).await.unwrap();

        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("source.txt");
        std::fs::write(&path, "data").unwrap();

        let cache = SourceCache::new("test");
        cache.get_or_load(&path, parse_text).await.unwrap();
        assert!(cache.fingerprint(&path).await.is_some());

        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        assert!(cache.fingerprint(&path).await.is_none());

        cache.get_or_load(&path, parse_text).await.unwrap();
        assert_eq!(cache.stats().misses, 2);

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_fingerprint_records_digest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("source.txt");
        std::fs::write(&path, "abc").unwrap();

        let cache = SourceCache::new("test");
        cache.get_or_load(&path, parse_text).await.unwrap();
        let fingerprint = cache.fingerprint(&path).await.unwrap();

        assert_eq!(fingerprint.len, 3);
        assert_eq!(
            fingerprint.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_fingerprint_without_entry_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("source.txt");
        std::fs::write(&path, "never loaded").unwrap();

        let cache: SourceCache<String> = SourceCache::new("test");
        assert!(cache.fingerprint(&path).await.is_none());
        assert!(cache
            .fingerprint(Path::new("/nonexistent/mems/source.txt"))
            .await
            .is_none());

        cache.get_or_load(&path, parse_text).await.unwrap();
        let fingerprint = cache.fingerprint(&path).await.unwrap();
        assert_eq!(fingerprint.path, std::fs::canonicalize(&path).unwrap());
        assert_eq!(fingerprint.len, 12);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let cache: SourceCache<String> = SourceCache::new("test");
        let err = cache
            .get_or_load(Path::new("/nonexistent/mems/source.txt"), parse_text)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_parse_error_is_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("source.bin");
        std::fs::write(&path, [0xff, 0xfe]).unwrap();

        let cache = SourceCache::new("test");
        assert!(cache.get_or_load(&path, parse_text).await.is_err());
        assert_eq!(cache.stats().entries, 0);
    }
}
