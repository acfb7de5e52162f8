//! Grid data loader
//!
//! Reads the per-point artifacts of a radiance sensor-grid simulation (sensor
//! positions, annual total irradiance and sky-view factor) and memoises each
//! parsed table in the matrix cache under `points`,
//! `total_irradiance_matrix` and `sky_view`.
//!
//! Tables are stored as `f32`. The comfort thresholds downstream are whole
//! degrees, so the narrowing is harmless.

pub mod artifacts;
pub mod parse;

pub use artifacts::{remove_temp_files, GridArtifacts};

use crate::cache::{load_or_compute, CachePolicy, CachedTable, MatrixCache};
use crate::core_types::Point2;
use crate::error::{ComfortError, Result};
use crate::weather::HOURS_PER_YEAR;
use tracing::info;

/// Cache key of the sensor positions (N × 2)
pub const POINTS_KEY: &str = "points";
/// Cache key of the annual irradiance (8760 × N)
pub const TOTAL_IRRADIANCE_KEY: &str = "total_irradiance_matrix";
/// Cache key of the sky-view percentages (1 × N)
pub const SKY_VIEW_KEY: &str = "sky_view";

/// Reads grid tables through a cache
pub struct GridLoader<'a> {
    artifacts: &'a GridArtifacts,
    cache: &'a dyn MatrixCache,
    policy: CachePolicy,
}

impl<'a> GridLoader<'a> {
    pub fn new(artifacts: &'a GridArtifacts, cache: &'a dyn MatrixCache, policy: CachePolicy) -> Self {
        Self {
            artifacts,
            cache,
            policy,
        }
    }

    /// Sensor positions as an (N × 2) table of x, y
    ///
    /// # Errors
    /// Propagates parse and cache errors.
    pub fn points_table(&self) -> Result<CachedTable> {
        let fingerprint = self.artifacts.points_fingerprint();
        load_or_compute(self.cache, self.policy, POINTS_KEY, fingerprint, || {
            info!("Processing points data");
            let points = parse::parse_points(&self.artifacts.points_files)?;
            let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
            CachedTable::from_f64(fingerprint, points.len(), 2, &flat)
        })
    }

    /// Sensor positions
    ///
    /// # Errors
    /// Propagates parse and cache errors; a table that is not N × 2 is `InvalidInput`.
    pub fn points(&self) -> Result<Vec<Point2>> {
        let table = self.points_table()?;
        if table.cols != 2 {
            return Err(ComfortError::invalid_input(format!(
                "points table has {} columns, expected 2",
                table.cols
            )));
        }
        Ok((0..table.rows)
            .map(|i| Point2::new(f64::from(table.get(i, 0)), f64::from(table.get(i, 1))))
            .collect())
    }

    /// Annual total irradiance, hour-major (8760 × N)
    ///
    /// # Errors
    /// Propagates parse and cache errors.
    pub fn total_irradiance(&self) -> Result<CachedTable> {
        let fingerprint = self.artifacts.irradiance_fingerprint();
        load_or_compute(self.cache, self.policy, TOTAL_IRRADIANCE_KEY, fingerprint, || {
            info!("Processing irradiance data");
            let hours = parse::parse_sun_up_hours(&self.artifacts.sun_up_hours_file)?;
            let (values, n_points) = parse::parse_irradiance(&self.artifacts.irradiance_files, &hours)?;
            CachedTable::from_f64(fingerprint, HOURS_PER_YEAR, n_points, &values)
        })
    }

    /// Sky-view percentage of every point (1 × N)
    ///
    /// # Errors
    /// Propagates parse and cache errors.
    pub fn sky_view(&self) -> Result<CachedTable> {
        let fingerprint = self.artifacts.sky_view_fingerprint();
        load_or_compute(self.cache, self.policy, SKY_VIEW_KEY, fingerprint, || {
            info!("Processing sky-view data");
            let values = parse::parse_sky_view(&self.artifacts.sky_view_file)?;
            CachedTable::from_f64(fingerprint, 1, values.len(), &values)
        })
    }
}

/// Check that every grid table describes the same number of points
///
/// # Errors
/// Returns `InvalidInput` naming the table that disagrees.
pub fn check_point_counts(points: usize, irradiance: &CachedTable, sky_view: &CachedTable) -> Result<()> {
    if irradiance.rows != HOURS_PER_YEAR {
        return Err(ComfortError::invalid_input(format!(
            "irradiance table has {} hours, expected {HOURS_PER_YEAR}",
            irradiance.rows
        )));
    }
    if irradiance.cols != points {
        return Err(ComfortError::invalid_input(format!(
            "irradiance describes {} points but the grid has {points}",
            irradiance.cols
        )));
    }
    if sky_view.cols != points {
        return Err(ComfortError::invalid_input(format!(
            "sky view describes {} points but the grid has {points}",
            sky_view.cols
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use std::fs;
    use std::path::Path;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn simulation(root: &Path) {
        write(
            &root.join("sky_view/model/grid/grid.pts"),
            "0 0 1 0 0 1\n5 0 1 0 0 1\n10 0 1 0 0 1\n",
        );
        write(&root.join("sky_view/results/grid.res"), "0\n50\n100\n");
        write(&root.join("annual_irradiance/results/total/sun-up-hours.txt"), "12.5\n");
        write(&root.join("annual_irradiance/results/total/grid.ill"), "10\n20\n30\n");
    }

    #[test]
    fn test_loads_and_caches_tables() {
        let dir = tempfile::tempdir().unwrap();
        simulation(dir.path());
        let artifacts = GridArtifacts::discover(dir.path()).unwrap();
        let cache = MemoryCache::new();
        let loader = GridLoader::new(&artifacts, &cache, CachePolicy::Validate);

        let points = loader.points().unwrap();
        let irradiance = loader.total_irradiance().unwrap();
        let sky_view = loader.sky_view().unwrap();

        assert_eq!(points, vec![Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(10.0, 0.0)]);
        assert_eq!(irradiance.get(12, 2), 30.0);
        assert_eq!(irradiance.get(13, 2), 0.0);
        assert_eq!(sky_view.values, vec![0.0, 50.0, 100.0]);
        assert!(check_point_counts(points.len(), &irradiance, &sky_view).is_ok());
        assert_eq!(cache.keys(), vec!["points", "sky_view", "total_irradiance_matrix"]);
    }

    #[test]
    fn test_point_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        simulation(dir.path());
        write(&dir.path().join("sky_view/results/grid.res"), "0\n50\n");
        let artifacts = GridArtifacts::discover(dir.path()).unwrap();
        let cache = MemoryCache::new();
        let loader = GridLoader::new(&artifacts, &cache, CachePolicy::Validate);

        let err = check_point_counts(
            loader.points().unwrap().len(),
            &loader.total_irradiance().unwrap(),
            &loader.sky_view().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ComfortError::InvalidInput { .. }));
    }
}
