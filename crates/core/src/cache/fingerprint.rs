//! Content fingerprints for cache validation

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Digest of everything a cached table was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Start a new fingerprint
    pub fn builder() -> FingerprintBuilder {
        FingerprintBuilder::default()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Incremental fingerprint builder
///
/// Floats are hashed by bit pattern, so `-0.0` and `0.0` differ and any
/// change to an input series changes the digest. Every field is prefixed
/// with a tag so that reordering inputs also changes the result.
#[derive(Default)]
pub struct FingerprintBuilder {
    hasher: FxHasher,
}

impl FingerprintBuilder {
    /// Mix in a label or identifier
    pub fn str(mut self, value: &str) -> Self {
        self.hasher.write_u8(b's');
        self.hasher.write_usize(value.len());
        self.hasher.write(value.as_bytes());
        self
    }

    /// Mix in an integer
    pub fn u64(mut self, value: u64) -> Self {
        self.hasher.write_u8(b'u');
        self.hasher.write_u64(value);
        self
    }

    /// Mix in a float
    pub fn f64(mut self, value: f64) -> Self {
        self.hasher.write_u8(b'f');
        self.hasher.write_u64(value.to_bits());
        self
    }

    /// Mix in a float series
    pub fn f64s(mut self, values: &[f64]) -> Self {
        self.hasher.write_u8(b'F');
        self.hasher.write_usize(values.len());
        for v in values {
            self.hasher.write_u64(v.to_bits());
        }
        self
    }

    /// Mix in an upstream fingerprint
    pub fn fingerprint(mut self, upstream: Fingerprint) -> Self {
        self.hasher.write_u8(b'p');
        self.hasher.write_u64(upstream.0);
        self
    }

    /// Mix in a file's identity (name, size, modification time)
    ///
    /// Raw simulation artifacts can be large, so their content is not read;
    /// rewriting a file updates its mtime and therefore the fingerprint. A
    /// missing file contributes only its name.
    pub fn file(mut self, path: &Path) -> Self {
        self.hasher.write_u8(b'P');
        if let Some(name) = path.file_name() {
            self.hasher.write(name.to_string_lossy().as_bytes());
        }
        if let Ok(meta) = path.metadata() {
            self.hasher.write_u64(meta.len());
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_nanos());
            self.hasher.write_u128(modified);
        }
        self
    }

    /// Finish the digest
    pub fn finish(self) -> Fingerprint {
        Fingerprint(self.hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_inputs_same_fingerprint() {
        let a = Fingerprint::builder().str("mrt").f64s(&[1.0, 2.0]).finish();
        let b = Fingerprint::builder().str("mrt").f64s(&[1.0, 2.0]).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_change_alters_fingerprint() {
        let base = Fingerprint::builder().str("mrt").f64s(&[1.0, 2.0]).finish();
        assert_ne!(base, Fingerprint::builder().str("mrt").f64s(&[1.0, 2.5]).finish());
        assert_ne!(base, Fingerprint::builder().str("rh").f64s(&[1.0, 2.0]).finish());
        assert_ne!(
            base,
            Fingerprint::builder().f64s(&[1.0, 2.0]).str("mrt").finish()
        );
    }

    #[test]
    fn test_file_fingerprint_tracks_content_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.pts");
        std::fs::write(&path, "0 0 0\n").unwrap();
        let before = Fingerprint::builder().file(&path).finish();
        std::fs::write(&path, "0 0 0\n1 0 0\n").unwrap();
        let after = Fingerprint::builder().file(&path).finish();
        assert_ne!(before, after);
    }
}
