//! Spatial interpolation engine
//!
//! Turns one sensor-grid simulation and one set of boundary conditions into
//! annual hourly matrices (8760 hours × N points) of:
//!
//! - mean radiant temperature, interpolated between shaded and unshaded
//!   bounds from irradiance by day and sky view by night
//! - moisture effectiveness from any water features
//! - dry-bulb temperature and relative humidity after evaporative cooling
//! - wind speed (the boundary series at every point)
//! - UTCI from the four matrices above
//!
//! Matrices are built lazily on first access, in dependency order, and each is
//! read from or written to the matrix cache under a fixed key.
//!
//! # Example
//!
//! ```no_run
//! use comfort_sim_core::config::SpatialConfig;
//! use comfort_sim_core::spatial::SpatialComfort;
//! use comfort_sim_core::weather::{AnalysisPeriod, BoundaryConditions};
//!
//! # fn main() -> comfort_sim_core::error::Result<()> {
//! let boundary = BoundaryConditions::from_json_file("boundary.json")?;
//! let result = SpatialComfort::new("simulation", boundary, SpatialConfig::default())?.into_result();
//! let comfortable = result.comfortable_hours(&AnalysisPeriod::whole_year(), true)?;
//! println!("{} points", comfortable.len());
//! # Ok(())
//! # }
//! ```

pub mod matrix;
pub mod mrt;

pub use matrix::SpatialMatrix;
pub use mrt::{interpolate_mrt, irradiance_ranges, IrradianceRange, MrtInputs};

use crate::cache::{load_or_compute, CachedTable, DiskCache, Fingerprint, MatrixCache};
use crate::config::SpatialConfig;
use crate::core_types::units::{Celsius, Pascals, Percent};
use crate::core_types::Point2;
use crate::error::Result;
use crate::grid::{check_point_counts, remove_temp_files, GridArtifacts, GridLoader};
use crate::moisture::{load_moisture_sources, MoistureFieldBuilder, MoistureSource};
use crate::physics::evaporative::apply_with_wet_bulb;
use crate::physics::{utci_array, wet_bulb_temperature};
use crate::weather::{
    hour_of_day, month_of_hour, validate_hour, validate_month, AnalysisPeriod,
    BoundaryConditions, WindStates, HOURS_PER_YEAR,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

pub const MEAN_RADIANT_TEMPERATURE_KEY: &str = "mean_radiant_temperature_matrix";
pub const DRY_BULB_TEMPERATURE_KEY: &str = "dry_bulb_temperature_matrix";
pub const RELATIVE_HUMIDITY_KEY: &str = "relative_humidity_matrix";
pub const WIND_SPEED_KEY: &str = "wind_speed_matrix";
pub const UTCI_KEY: &str = "universal_thermal_climate_index_matrix";

/// A validated simulation directory paired with its boundary conditions
pub struct SpatialComfort {
    simulation_dir: PathBuf,
    artifacts: GridArtifacts,
    boundary: BoundaryConditions,
    config: SpatialConfig,
    moisture_sources: Vec<MoistureSource>,
    cache: Box<dyn MatrixCache>,
}

impl SpatialComfort {
    /// Open `simulation_dir`, caching matrices beside the artifacts
    ///
    /// # Errors
    /// Returns `MissingData` for absent or ambiguous grid artifacts,
    /// `MalformedMoistureSources` for a bad sidecar and `InvalidInput` for
    /// invalid configuration or boundary conditions.
    pub fn new<P: AsRef<Path>>(
        simulation_dir: P,
        boundary: BoundaryConditions,
        config: SpatialConfig,
    ) -> Result<Self> {
        let cache = DiskCache::new(simulation_dir.as_ref());
        Self::with_cache(simulation_dir, boundary, config, Box::new(cache))
    }

    /// Open `simulation_dir` with a caller-supplied cache
    ///
    /// # Errors
    /// As [`SpatialComfort::new`].
    pub fn with_cache<P: AsRef<Path>>(
        simulation_dir: P,
        boundary: BoundaryConditions,
        config: SpatialConfig,
        cache: Box<dyn MatrixCache>,
    ) -> Result<Self> {
        let simulation_dir = simulation_dir.as_ref().to_path_buf();
        config.validate()?;
        boundary.validate()?;

        let artifacts = GridArtifacts::discover(&simulation_dir)?;
        if config.remove_temp_files {
            remove_temp_files(&simulation_dir)?;
        }
        let moisture_sources = load_moisture_sources(&simulation_dir)?;

        info!(
            dir = %simulation_dir.display(),
            moisture_sources = moisture_sources.len(),
            "Opened spatial comfort simulation"
        );
        Ok(Self {
            simulation_dir,
            artifacts,
            boundary,
            config,
            moisture_sources,
            cache,
        })
    }

    pub fn simulation_dir(&self) -> &Path {
        &self.simulation_dir
    }

    pub fn boundary(&self) -> &BoundaryConditions {
        &self.boundary
    }

    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    pub fn moisture_sources(&self) -> &[MoistureSource] {
        &self.moisture_sources
    }

    /// Lazily evaluated matrices for this simulation
    pub fn into_result(self) -> SpatialComfortResult {
        SpatialComfortResult::new(self)
    }
}

/// Value of `cell`, initialising it with `init` on first use
fn memoised<'c, T>(cell: &'c OnceLock<T>, init: impl FnOnce() -> Result<T>) -> Result<&'c T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

/// Memoised matrices of one [`SpatialComfort`]
///
/// Each getter builds its dependencies first and returns the same value on
/// every later call.
pub struct SpatialComfortResult {
    comfort: SpatialComfort,
    wind_states: OnceLock<WindStates>,
    points: OnceLock<Vec<Point2>>,
    total_irradiance: OnceLock<CachedTable>,
    sky_view: OnceLock<Vec<f64>>,
    mean_radiant_temperature: OnceLock<SpatialMatrix>,
    moisture: OnceLock<SpatialMatrix>,
    evaporated: OnceLock<(SpatialMatrix, SpatialMatrix)>,
    dry_bulb_temperature: OnceLock<SpatialMatrix>,
    relative_humidity: OnceLock<SpatialMatrix>,
    wind_speed: OnceLock<SpatialMatrix>,
    utci: OnceLock<SpatialMatrix>,
}

impl SpatialComfortResult {
    pub fn new(comfort: SpatialComfort) -> Self {
        Self {
            comfort,
            wind_states: OnceLock::new(),
            points: OnceLock::new(),
            total_irradiance: OnceLock::new(),
            sky_view: OnceLock::new(),
            mean_radiant_temperature: OnceLock::new(),
            moisture: OnceLock::new(),
            evaporated: OnceLock::new(),
            dry_bulb_temperature: OnceLock::new(),
            relative_humidity: OnceLock::new(),
            wind_speed: OnceLock::new(),
            utci: OnceLock::new(),
        }
    }

    pub fn comfort(&self) -> &SpatialComfort {
        &self.comfort
    }

    fn loader(&self) -> GridLoader<'_> {
        GridLoader::new(
            &self.comfort.artifacts,
            self.comfort.cache.as_ref(),
            self.comfort.config.cache_policy,
        )
    }

    fn wind_states(&self) -> &WindStates {
        self.wind_states
            .get_or_init(|| self.comfort.boundary.wind_states())
    }

    /// Sensor positions
    ///
    /// # Errors
    /// Propagates parse and cache errors.
    pub fn points(&self) -> Result<&[Point2]> {
        memoised(&self.points, || self.loader().points()).map(Vec::as_slice)
    }

    /// Number of sensor points
    ///
    /// # Errors
    /// As [`Self::points`].
    pub fn n_points(&self) -> Result<usize> {
        Ok(self.points()?.len())
    }

    /// Annual total irradiance (8760 × N)
    ///
    /// # Errors
    /// Propagates parse and cache errors; a point count that disagrees with
    /// the grid is `InvalidInput`.
    pub fn total_irradiance(&self) -> Result<&CachedTable> {
        memoised(&self.total_irradiance, || {
            let table = self.loader().total_irradiance()?;
            let sky_view = self.loader().sky_view()?;
            check_point_counts(self.n_points()?, &table, &sky_view)?;
            Ok(table)
        })
    }

    /// Sky-view percentage per point
    ///
    /// # Errors
    /// Propagates parse and cache errors.
    pub fn sky_view(&self) -> Result<&[f64]> {
        memoised(&self.sky_view, || {
            let table = self.loader().sky_view()?;
            Ok(table.values.iter().map(|&v| f64::from(v)).collect())
        })
        .map(Vec::as_slice)
    }

    /// Sky-view percentage per point, for mapping
    ///
    /// # Errors
    /// As [`Self::sky_view`].
    pub fn sky_view_percent(&self) -> Result<Vec<f64>> {
        Ok(self.sky_view()?.to_vec())
    }

    fn mrt_fingerprint(&self) -> Fingerprint {
        let smoother = &self.comfort.config.smoother;
        Fingerprint::builder()
            .str(MEAN_RADIANT_TEMPERATURE_KEY)
            .fingerprint(self.comfort.boundary.mrt_fingerprint())
            .fingerprint(self.comfort.artifacts.irradiance_fingerprint())
            .fingerprint(self.comfort.artifacts.sky_view_fingerprint())
            .f64(smoother.difference_threshold)
            .u64(smoother.transition_window as u64)
            .f64(smoother.ewm_span)
            .finish()
    }

    /// Mean radiant temperature (8760 × N)
    ///
    /// # Errors
    /// Propagates grid and cache errors.
    pub fn mean_radiant_temperature(&self) -> Result<&SpatialMatrix> {
        memoised(&self.mean_radiant_temperature, || {
            let n = self.n_points()?;
            let fingerprint = self.mrt_fingerprint();
            let cache = self.comfort.cache.as_ref();
            let table = load_or_compute(
                cache,
                self.comfort.config.cache_policy,
                MEAN_RADIANT_TEMPERATURE_KEY,
                fingerprint,
                || {
                    info!("Processing mean-radiant-temperature data");
                    let boundary = &self.comfort.boundary;
                    let sun_up = boundary.sun_up();
                    let inputs = MrtInputs {
                        shaded: boundary.shaded_mean_radiant_temperature.values(),
                        unshaded: boundary.unshaded_mean_radiant_temperature.values(),
                        sun_up: &sun_up,
                        irradiance: self.total_irradiance()?,
                        sky_view: self.sky_view()?,
                    };
                    let values = interpolate_mrt(&inputs, &self.comfort.config.smoother)?;
                    CachedTable::from_f64(fingerprint, HOURS_PER_YEAR, n, &values)
                },
            )?;
            SpatialMatrix::from_table(table, n)
        })
    }

    fn field_builder<'s>(&'s self, points: &'s [Point2]) -> MoistureFieldBuilder<'s> {
        MoistureFieldBuilder::new(points, self.wind_states(), self.comfort.config.plume)
    }

    fn moisture_fingerprint(&self) -> Result<Fingerprint> {
        let points_fp = self.comfort.artifacts.points_fingerprint();
        let builder = self.field_builder(self.points()?);
        Ok(self
            .comfort
            .moisture_sources
            .iter()
            .fold(
                Fingerprint::builder().str("moisture").fingerprint(points_fp),
                |b, s| b.fingerprint(builder.source_fingerprint(s, points_fp)),
            )
            .u64(self.comfort.moisture_sources.len() as u64)
            .finish())
    }

    /// Evaporative-cooling effectiveness (8760 × N)
    ///
    /// Each source's per-wind-state field is cached; the hourly expansion is
    /// rebuilt in memory.
    ///
    /// # Errors
    /// Propagates grid and cache errors.
    pub fn moisture(&self) -> Result<&SpatialMatrix> {
        memoised(&self.moisture, || {
            let points = self.points()?;
            let values = self.field_builder(points).hourly_matrix(
                &self.comfort.moisture_sources,
                self.comfort.artifacts.points_fingerprint(),
                self.comfort.cache.as_ref(),
                self.comfort.config.cache_policy,
            )?;
            SpatialMatrix::from_f64(self.moisture_fingerprint()?, points.len(), &values)
        })
    }

    /// DBT and RH after evaporative cooling, computed together
    fn evaporated(&self) -> Result<&(SpatialMatrix, SpatialMatrix)> {
        memoised(&self.evaporated, || {
            info!("Calculating DBT/RH matrices");
            let moisture = self.moisture()?;
            let n = moisture.cols();
            let boundary = &self.comfort.boundary;
            let dbt = boundary.dry_bulb_temperature.values();
            let rh = boundary.relative_humidity.values();
            let pressure = boundary.atmospheric_pressure.values();

            let mut dbt_values = vec![0.0_f64; HOURS_PER_YEAR * n];
            let mut rh_values = vec![0.0_f64; HOURS_PER_YEAR * n];
            if n > 0 {
                dbt_values
                    .par_chunks_mut(n)
                    .zip(rh_values.par_chunks_mut(n))
                    .enumerate()
                    .for_each(|(h, (dbt_row, rh_row))| {
                        let ambient_dbt = Celsius::new(dbt[h]);
                        let ambient_rh = Percent::new(rh[h]);
                        let effectiveness = moisture.row(h);
                        let wet_bulb = effectiveness.iter().any(|&e| e > 0.0).then(|| {
                            wet_bulb_temperature(ambient_dbt, ambient_rh, Pascals::new(pressure[h]))
                        });
                        for p in 0..n {
                            let (t, r) = match wet_bulb {
                                Some(wb) => apply_with_wet_bulb(
                                    ambient_dbt,
                                    ambient_rh,
                                    wb,
                                    f64::from(effectiveness[p]),
                                ),
                                None => (ambient_dbt, ambient_rh),
                            };
                            dbt_row[p] = *t;
                            rh_row[p] = *r;
                        }
                    });
            }
            Ok((
                SpatialMatrix::from_f64(self.dry_bulb_fingerprint()?, n, &dbt_values)?,
                SpatialMatrix::from_f64(self.relative_humidity_fingerprint()?, n, &rh_values)?,
            ))
        })
    }

    fn weather_fingerprint(&self, key: &str) -> Result<Fingerprint> {
        let builder = self
            .comfort
            .boundary
            .fingerprint_weather(Fingerprint::builder().str(key));
        Ok(builder.fingerprint(self.moisture_fingerprint()?).finish())
    }

    fn dry_bulb_fingerprint(&self) -> Result<Fingerprint> {
        self.weather_fingerprint(DRY_BULB_TEMPERATURE_KEY)
    }

    fn relative_humidity_fingerprint(&self) -> Result<Fingerprint> {
        self.weather_fingerprint(RELATIVE_HUMIDITY_KEY)
    }

    /// Build a weather matrix: the boundary series at every point without
    /// moisture, the evaporated matrix otherwise
    fn weather_matrix<'s>(
        &'s self,
        cell: &'s OnceLock<SpatialMatrix>,
        key: &str,
        fingerprint: Fingerprint,
        series: &[f64],
        pick: fn(&(SpatialMatrix, SpatialMatrix)) -> &SpatialMatrix,
    ) -> Result<&'s SpatialMatrix> {
        memoised(cell, || {
            let n = self.n_points()?;
            let table = load_or_compute(
                self.comfort.cache.as_ref(),
                self.comfort.config.cache_policy,
                key,
                fingerprint,
                || {
                    if self.comfort.moisture_sources.is_empty() {
                        info!(key, "No moisture sources, broadcasting boundary series");
                        SpatialMatrix::broadcast(fingerprint, series, n)?.to_table()
                    } else {
                        pick(self.evaporated()?).to_table()
                    }
                },
            )?;
            SpatialMatrix::from_table(table, n)
        })
    }

    /// Dry-bulb temperature (8760 × N)
    ///
    /// # Errors
    /// Propagates grid and cache errors.
    pub fn dry_bulb_temperature(&self) -> Result<&SpatialMatrix> {
        self.weather_matrix(
            &self.dry_bulb_temperature,
            DRY_BULB_TEMPERATURE_KEY,
            self.dry_bulb_fingerprint()?,
            self.comfort.boundary.dry_bulb_temperature.values(),
            |pair| &pair.0,
        )
    }

    /// Relative humidity (8760 × N)
    ///
    /// # Errors
    /// Propagates grid and cache errors.
    pub fn relative_humidity(&self) -> Result<&SpatialMatrix> {
        self.weather_matrix(
            &self.relative_humidity,
            RELATIVE_HUMIDITY_KEY,
            self.relative_humidity_fingerprint()?,
            self.comfort.boundary.relative_humidity.values(),
            |pair| &pair.1,
        )
    }

    /// Wind speed (8760 × N), the boundary series at every point
    ///
    /// # Errors
    /// Propagates grid and cache errors.
    pub fn wind_speed(&self) -> Result<&SpatialMatrix> {
        memoised(&self.wind_speed, || {
            let n = self.n_points()?;
            let series = self.comfort.boundary.wind_speed.values();
            let fingerprint = Fingerprint::builder()
                .str(WIND_SPEED_KEY)
                .f64s(series)
                .fingerprint(self.comfort.artifacts.points_fingerprint())
                .finish();
            let table = load_or_compute(
                self.comfort.cache.as_ref(),
                self.comfort.config.cache_policy,
                WIND_SPEED_KEY,
                fingerprint,
                || SpatialMatrix::broadcast(fingerprint, series, n)?.to_table(),
            )?;
            SpatialMatrix::from_table(table, n)
        })
    }

    /// Universal Thermal Climate Index (8760 × N)
    ///
    /// # Errors
    /// Propagates errors from every upstream matrix.
    pub fn universal_thermal_climate_index(&self) -> Result<&SpatialMatrix> {
        memoised(&self.utci, || {
            let dbt = self.dry_bulb_temperature()?;
            let mrt = self.mean_radiant_temperature()?;
            let ws = self.wind_speed()?;
            let rh = self.relative_humidity()?;
            let n = dbt.cols();
            let range = self.comfort.config.utci_wind_speed_range;
            let fingerprint = Fingerprint::builder()
                .str(UTCI_KEY)
                .fingerprint(dbt.fingerprint())
                .fingerprint(mrt.fingerprint())
                .fingerprint(ws.fingerprint())
                .fingerprint(rh.fingerprint())
                .f64(range.0)
                .f64(range.1)
                .finish();

            let table = load_or_compute(
                self.comfort.cache.as_ref(),
                self.comfort.config.cache_policy,
                UTCI_KEY,
                fingerprint,
                || {
                    info!("Processing universal thermal climate index data");
                    let widen = |row: &[f32]| row.iter().map(|&v| f64::from(v)).collect::<Vec<_>>();
                    let rows: Vec<Vec<f64>> = (0..HOURS_PER_YEAR)
                        .into_par_iter()
                        .map(|h| {
                            utci_array(
                                &widen(dbt.row(h)),
                                &widen(mrt.row(h)),
                                &widen(ws.row(h)),
                                &widen(rh.row(h)),
                                range,
                            )
                        })
                        .collect::<Result<_>>()?;
                    let flat: Vec<f64> = rows.into_iter().flatten().collect();
                    CachedTable::from_f64(fingerprint, HOURS_PER_YEAR, n, &flat)
                },
            )?;
            SpatialMatrix::from_table(table, n)
        })
    }

    /// Hours (or percentage of hours) in `period` with UTCI inside the
    /// comfort limits, per point
    ///
    /// # Errors
    /// Propagates errors from the UTCI matrix.
    pub fn comfortable_hours(&self, period: &AnalysisPeriod, as_percentage: bool) -> Result<Vec<f64>> {
        let utci = self.universal_thermal_climate_index()?;
        let limits = self.comfort.config.comfort_limits;
        let hours = period.hours_of_year();
        let total = hours.len();
        Ok(utci.map_columns(&hours, |values| {
            let count = values.filter(|&v| limits.contains(v)).count() as f64;
            if as_percentage {
                if total == 0 {
                    0.0
                } else {
                    count / total as f64 * 100.0
                }
            } else {
                count
            }
        }))
    }

    /// Mean UTCI per point over every day of `month` at `hour`
    ///
    /// # Errors
    /// Returns `InvalidInput` for a month outside 1-12 or an hour outside
    /// 0-23; otherwise propagates errors from the UTCI matrix.
    pub fn typical_utci(&self, month: u32, hour: u32) -> Result<Vec<f64>> {
        validate_month(month)?;
        validate_hour(hour)?;
        let utci = self.universal_thermal_climate_index()?;
        let hours: Vec<usize> = (0..HOURS_PER_YEAR)
            .filter(|&h| month_of_hour(h) == month && hour_of_day(h) == hour)
            .collect();
        let count = hours.len() as f64;
        Ok(utci.map_columns(&hours, |values| values.sum::<f64>() / count))
    }
}
