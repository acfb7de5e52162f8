//! Matrix cache
//!
//! Building an (8760 × N) matrix is far more expensive than reading one back,
//! so every derived table is persisted under a stable key (`points`,
//! `mean_radiant_temperature_matrix`, `moisture_<source>` ...). Each entry
//! carries the [`Fingerprint`] of the inputs it was built from, and the
//! [`CachePolicy`] decides whether that fingerprint is checked on load:
//!
//! - [`CachePolicy::Validate`] recomputes an entry whose fingerprint no
//!   longer matches its inputs.
//! - [`CachePolicy::Trust`] returns whatever is stored. Deleting the entry is
//!   then the only way to force a recompute.
//!
//! Unreadable entries are always recomputed and overwritten.

pub mod disk;
pub mod fingerprint;
pub mod memory;
pub mod table;

pub use disk::DiskCache;
pub use fingerprint::{Fingerprint, FingerprintBuilder};
pub use memory::MemoryCache;
pub use table::CachedTable;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Staleness policy for stored entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Entries are used only if their fingerprint matches the inputs
    #[default]
    Validate,
    /// Any stored entry is used as-is
    Trust,
}

/// Key-value store of [`CachedTable`]s
pub trait MatrixCache: Send + Sync {
    /// Stored entry for `key`, if any
    ///
    /// # Errors
    /// Returns an error if the entry exists but cannot be read or decoded.
    fn load(&self, key: &str) -> Result<Option<CachedTable>>;

    /// Store (or replace) the entry for `key`
    ///
    /// # Errors
    /// Returns an error if the entry cannot be encoded or written.
    fn store(&self, key: &str, table: &CachedTable) -> Result<()>;

    /// Remove the entry for `key`; removing a missing entry is not an error
    ///
    /// # Errors
    /// Returns an error if an existing entry cannot be removed.
    fn invalidate(&self, key: &str) -> Result<()>;

    /// Remove every entry
    ///
    /// # Errors
    /// Returns an error if an entry cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// Return the cached table for `key`, computing and storing it when needed
///
/// `compute` receives nothing and must return a table tagged with
/// `expected`; the stored copy is what later runs will load.
///
/// # Errors
/// Propagates errors from `compute` and from storing the new entry.
pub fn load_or_compute<C, F>(
    cache: &C,
    policy: CachePolicy,
    key: &str,
    expected: Fingerprint,
    compute: F,
) -> Result<CachedTable>
where
    C: MatrixCache + ?Sized,
    F: FnOnce() -> Result<CachedTable>,
{
    match cache.load(key) {
        Ok(Some(table)) => match policy {
            CachePolicy::Trust => {
                debug!(key, "Using cached table without validation");
                return Ok(table);
            }
            CachePolicy::Validate if table.fingerprint == expected => {
                debug!(key, fingerprint = %expected, "Cache hit");
                return Ok(table);
            }
            CachePolicy::Validate => {
                warn!(
                    key,
                    stored = %table.fingerprint,
                    expected = %expected,
                    "Cached table is stale, recomputing"
                );
            }
        },
        Ok(None) => debug!(key, "Cache miss"),
        Err(e) => warn!(key, error = %e, "Unreadable cache entry, recomputing"),
    }

    let table = compute()?;
    cache.store(key, &table)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn table(fingerprint: Fingerprint, value: f32) -> CachedTable {
        CachedTable::new(fingerprint, 1, 2, vec![value, value]).unwrap()
    }

    #[test]
    fn test_computes_once_then_hits() {
        let cache = MemoryCache::new();
        let calls = Cell::new(0);
        let fp = Fingerprint(1);
        for _ in 0..3 {
            let t = load_or_compute(&cache, CachePolicy::Validate, "mrt", fp, || {
                calls.set(calls.get() + 1);
                Ok(table(fp, 20.0))
            })
            .unwrap();
            assert_eq!(t.values, vec![20.0, 20.0]);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_validate_recomputes_stale_entry() {
        let cache = MemoryCache::new();
        cache.store("mrt", &table(Fingerprint(1), 20.0)).unwrap();

        let t = load_or_compute(&cache, CachePolicy::Validate, "mrt", Fingerprint(2), || {
            Ok(table(Fingerprint(2), 30.0))
        })
        .unwrap();
        assert_eq!(t.values[0], 30.0);
        assert_eq!(cache.load("mrt").unwrap().unwrap().fingerprint, Fingerprint(2));
    }

    #[test]
    fn test_trust_returns_stale_entry_verbatim() {
        let cache = MemoryCache::new();
        cache.store("mrt", &table(Fingerprint(1), 20.0)).unwrap();

        let t = load_or_compute(&cache, CachePolicy::Trust, "mrt", Fingerprint(2), || {
            panic!("trusted entry must not be recomputed")
        })
        .unwrap();
        assert_eq!(t.values[0], 20.0);
    }

    #[test]
    fn test_corrupt_disk_entry_is_recomputed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("utci.cache"), b"corrupt").unwrap();
        let cache = DiskCache::new(dir.path());
        let t = load_or_compute(&cache, CachePolicy::Trust, "utci", Fingerprint(3), || {
            Ok(table(Fingerprint(3), 12.0))
        })
        .unwrap();
        assert_eq!(t.values[1], 12.0);
        assert_eq!(cache.load("utci").unwrap().unwrap(), t);
    }

    #[test]
    fn test_policy_serde_names() {
        assert_eq!(serde_json::to_string(&CachePolicy::Trust).unwrap(), "\"trust\"");
        let p: CachePolicy = serde_json::from_str("\"validate\"").unwrap();
        assert_eq!(p, CachePolicy::Validate);
    }
}
