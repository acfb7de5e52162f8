//! Cache files stored beside the simulation artifacts

use crate::cache::{CachedTable, MatrixCache};
use crate::error::{ComfortError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of cache entries
pub const CACHE_EXTENSION: &str = "cache";

/// One `<key>.cache` file per table in a directory
///
/// Entries are zstd-compressed bincode. Writes go to a temporary file in the
/// same directory which is then renamed over the target, so a reader never
/// observes a half-written entry. There is no locking between processes.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Cache rooted at `dir` (usually the simulation directory)
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `key`
    ///
    /// # Errors
    /// Returns `Cache` if the key could escape the cache directory.
    pub fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\'])
        {
            return Err(ComfortError::cache(key, "key is not a plain file stem"));
        }
        Ok(self.dir.join(format!("{key}.{CACHE_EXTENSION}")))
    }
}

impl MatrixCache for DiskCache {
    fn load(&self, key: &str) -> Result<Option<CachedTable>> {
        let path = self.entry_path(key)?;
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let table = CachedTable::decode(key, &compressed)?;
        debug!(
            key,
            rows = table.rows,
            cols = table.cols,
            bytes = compressed.len(),
            "Loaded cache entry"
        );
        Ok(Some(table))
    }

    fn store(&self, key: &str, table: &CachedTable) -> Result<()> {
        let path = self.entry_path(key)?;
        let compressed = table.encode(key)?;

        fs::create_dir_all(&self.dir)?;
        let tmp = self
            .dir
            .join(format!(".{key}.{}.tmp", std::process::id()));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(key, bytes = compressed.len(), path = %path.display(), "Stored cache entry");
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == CACHE_EXTENSION)
            {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Fingerprint;

    fn table() -> CachedTable {
        CachedTable::new(Fingerprint(7), 2, 2, vec![1.5, 2.5, -3.25, 40.0]).unwrap()
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.store("mean_radiant_temperature_matrix", &table()).unwrap();

        assert!(dir.path().join("mean_radiant_temperature_matrix.cache").exists());
        let loaded = cache.load("mean_radiant_temperature_matrix").unwrap();
        assert_eq!(loaded, Some(table()));
    }

    #[test]
    fn test_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        assert_eq!(cache.load("points").unwrap(), None);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.store("a", &table()).unwrap();
        cache.store("b", &table()).unwrap();
        std::fs::write(dir.path().join("keep.txt"), "x").unwrap();

        cache.invalidate("a").unwrap();
        cache.invalidate("a").unwrap();
        assert_eq!(cache.load("a").unwrap(), None);

        cache.clear().unwrap();
        assert_eq!(cache.load("b").unwrap(), None);
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let cache = DiskCache::new("/tmp");
        assert!(cache.entry_path("../escape").is_err());
        assert!(cache.entry_path("").is_err());
        assert!(cache.entry_path("moisture_pond_1").is_ok());
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sky_view.cache"), b"garbage").unwrap();
        let cache = DiskCache::new(dir.path());
        assert!(cache.load("sky_view").is_err());
    }
}
