//! The single persisted table shape

use crate::cache::Fingerprint;
use crate::error::{ComfortError, Result};
use serde::{Deserialize, Serialize};

/// Row-major `f32` table tagged with the fingerprint of its inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedTable {
    /// Fingerprint of the inputs the table was computed from
    pub fingerprint: Fingerprint,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// `rows * cols` values, row-major
    pub values: Vec<f32>,
}

impl CachedTable {
    /// Create a table, checking that `values` fills `rows × cols`
    ///
    /// # Errors
    /// Returns `InvalidInput` on a size mismatch.
    pub fn new(fingerprint: Fingerprint, rows: usize, cols: usize, values: Vec<f32>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(values.len()) {
            return Err(ComfortError::invalid_input(format!(
                "table of {rows}x{cols} cannot hold {} values",
                values.len()
            )));
        }
        Ok(Self {
            fingerprint,
            rows,
            cols,
            values,
        })
    }

    /// Create a table from `f64` values, narrowing to `f32`
    ///
    /// # Errors
    /// Returns `InvalidInput` on a size mismatch.
    pub fn from_f64(fingerprint: Fingerprint, rows: usize, cols: usize, values: &[f64]) -> Result<Self> {
        Self::new(
            fingerprint,
            rows,
            cols,
            values.iter().map(|&v| v as f32).collect(),
        )
    }

    /// Check the stored shape is self-consistent (after decoding)
    pub(crate) fn is_consistent(&self) -> bool {
        self.rows.checked_mul(self.cols) == Some(self.values.len())
    }

    /// Value at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    /// One row as a slice
    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Encode as zstd-compressed bincode
    pub(crate) fn encode(&self, key: &str) -> Result<Vec<u8>> {
        let bytes = bincode::serialize(self).map_err(|e| ComfortError::cache(key, e.to_string()))?;
        // level 9 for a high ratio; tables are written once and read often
        zstd::encode_all(&bytes[..], 9).map_err(|e| ComfortError::cache(key, e.to_string()))
    }

    /// Decode from zstd-compressed bincode
    pub(crate) fn decode(key: &str, compressed: &[u8]) -> Result<Self> {
        let bytes = zstd::decode_all(compressed).map_err(|e| ComfortError::cache(key, e.to_string()))?;
        let table: Self =
            bincode::deserialize(&bytes).map_err(|e| ComfortError::cache(key, e.to_string()))?;
        if !table.is_consistent() {
            return Err(ComfortError::cache(
                key,
                format!(
                    "stored shape {}x{} does not match {} values",
                    table.rows,
                    table.cols,
                    table.values.len()
                ),
            ));
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_is_checked() {
        assert!(CachedTable::new(Fingerprint(1), 2, 3, vec![0.0; 6]).is_ok());
        assert!(CachedTable::new(Fingerprint(1), 2, 3, vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_encode_decode_is_bit_identical() {
        let values = vec![0.1_f32, -273.15, f32::MAX, 1e-30, 26.0, 9.0];
        let table = CachedTable::new(Fingerprint(42), 3, 2, values).unwrap();
        let bytes = table.encode("utci").unwrap();
        let back = CachedTable::decode("utci", &bytes).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.row(1), &[f32::MAX, 1e-30]);
        assert_eq!(back.get(2, 0), 26.0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(CachedTable::decode("points", b"not a zstd frame").is_err());
    }
}
