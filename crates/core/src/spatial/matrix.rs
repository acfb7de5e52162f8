//! Hour-major (8760 × N) per-point matrices

use crate::cache::{CachedTable, Fingerprint};
use crate::error::{ComfortError, Result};
use crate::weather::HOURS_PER_YEAR;
use rayon::prelude::*;

/// Annual hourly values of one variable at every grid point
///
/// Stored row-major with one row per hour of the year. Values are kept as
/// `f32`; arithmetic widens to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialMatrix {
    fingerprint: Fingerprint,
    cols: usize,
    values: Vec<f32>,
}

impl SpatialMatrix {
    /// Build from hour-major `f64` values
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `values.len() == 8760 * cols`.
    pub fn from_f64(fingerprint: Fingerprint, cols: usize, values: &[f64]) -> Result<Self> {
        if values.len() != HOURS_PER_YEAR * cols {
            return Err(ComfortError::invalid_input(format!(
                "spatial matrix needs {HOURS_PER_YEAR} x {cols} values, got {}",
                values.len()
            )));
        }
        Ok(Self {
            fingerprint,
            cols,
            values: values.iter().map(|&v| v as f32).collect(),
        })
    }

    /// Repeat an hourly series at every one of `cols` points
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `series` covers 8760 hours.
    pub fn broadcast(fingerprint: Fingerprint, series: &[f64], cols: usize) -> Result<Self> {
        if series.len() != HOURS_PER_YEAR {
            return Err(ComfortError::invalid_input(format!(
                "cannot broadcast a series of {} values over {HOURS_PER_YEAR} hours",
                series.len()
            )));
        }
        let mut values = Vec::with_capacity(HOURS_PER_YEAR * cols);
        for &v in series {
            values.extend(std::iter::repeat_n(v as f32, cols));
        }
        Ok(Self {
            fingerprint,
            cols,
            values,
        })
    }

    /// Adopt a cached table
    ///
    /// # Errors
    /// Returns `InvalidInput` if the table is not 8760 × `cols`.
    pub fn from_table(table: CachedTable, cols: usize) -> Result<Self> {
        if table.rows != HOURS_PER_YEAR || table.cols != cols {
            return Err(ComfortError::invalid_input(format!(
                "cached table is {} x {}, expected {HOURS_PER_YEAR} x {cols}",
                table.rows, table.cols
            )));
        }
        Ok(Self {
            fingerprint: table.fingerprint,
            cols,
            values: table.values,
        })
    }

    /// Copy into a cacheable table
    ///
    /// # Errors
    /// Never fails for a well-formed matrix; the shape is rechecked by the table.
    pub fn to_table(&self) -> Result<CachedTable> {
        CachedTable::new(self.fingerprint, HOURS_PER_YEAR, self.cols, self.values.clone())
    }

    /// Fingerprint of the inputs this matrix was built from
    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Hours (always 8760)
    #[inline]
    pub fn rows(&self) -> usize {
        HOURS_PER_YEAR
    }

    /// Grid points
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at `hour`, `point`
    #[inline]
    pub fn get(&self, hour: usize, point: usize) -> f64 {
        f64::from(self.values[hour * self.cols + point])
    }

    /// Every point at one hour
    #[inline]
    pub fn row(&self, hour: usize) -> &[f32] {
        &self.values[hour * self.cols..(hour + 1) * self.cols]
    }

    /// One point over the year
    pub fn column(&self, point: usize) -> Vec<f64> {
        (0..HOURS_PER_YEAR).map(|h| self.get(h, point)).collect()
    }

    /// Reduce each point's values over `hours` with `f`
    pub fn map_columns<T, F>(&self, hours: &[usize], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&mut dyn Iterator<Item = f64>) -> T + Sync,
    {
        (0..self.cols)
            .into_par_iter()
            .map(|p| f(&mut hours.iter().map(|&h| self.get(h, p))))
            .collect()
    }

    /// Apply `f(hour, row)` to every hour, producing a new matrix
    ///
    /// # Errors
    /// Returns `InvalidInput` if `f` returns a row of the wrong width.
    pub fn map_rows<F>(&self, fingerprint: Fingerprint, f: F) -> Result<Self>
    where
        F: Fn(usize, &[f32]) -> Vec<f64> + Sync,
    {
        let rows: Vec<Vec<f64>> = (0..HOURS_PER_YEAR)
            .into_par_iter()
            .map(|h| f(h, self.row(h)))
            .collect();
        if let Some(h) = rows.iter().position(|r| r.len() != self.cols) {
            return Err(ComfortError::invalid_input(format!(
                "row mapper produced {} values at hour {h}, expected {}",
                rows[h].len(),
                self.cols
            )));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Self::from_f64(fingerprint, self.cols, &flat)
    }
}
