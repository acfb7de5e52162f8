//! Site boundary conditions
//!
//! The weather record for one reference year plus the two bracketing mean
//! radiant temperature series (fully shaded and fully exposed) produced by an
//! external radiance/energy simulation.

use crate::cache::{Fingerprint, FingerprintBuilder};
use crate::core_types::units::{Celsius, Degrees, MetersPerSecond};
use crate::error::{ComfortError, Result};
use crate::weather::series::HourlyTimeSeries;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Hourly inputs shared by every grid point and typology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConditions {
    /// Dry-bulb temperature (°C)
    pub dry_bulb_temperature: HourlyTimeSeries,
    /// Relative humidity (%)
    pub relative_humidity: HourlyTimeSeries,
    /// Wind speed 10 m above ground (m/s)
    pub wind_speed: HourlyTimeSeries,
    /// Wind direction, degrees clockwise from north the wind blows *from*
    pub wind_direction: HourlyTimeSeries,
    /// Station pressure (Pa)
    pub atmospheric_pressure: HourlyTimeSeries,
    /// Global horizontal radiation (W/m²)
    pub global_horizontal_radiation: HourlyTimeSeries,
    /// Mean radiant temperature of a fully shaded point (°C)
    pub shaded_mean_radiant_temperature: HourlyTimeSeries,
    /// Mean radiant temperature of a fully exposed point (°C)
    pub unshaded_mean_radiant_temperature: HourlyTimeSeries,
    /// Solar altitude (degrees above horizon), for shelter sun blocking
    #[serde(default)]
    pub solar_altitude: Option<HourlyTimeSeries>,
    /// Solar azimuth (degrees clockwise from north), for shelter sun blocking
    #[serde(default)]
    pub solar_azimuth: Option<HourlyTimeSeries>,
}

impl BoundaryConditions {
    /// Load from a JSON document and validate
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or fails [`Self::validate`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let boundary: Self = serde_json::from_str(&contents)?;
        boundary.validate()?;
        debug!(path = %path.display(), "Loaded boundary conditions");
        Ok(boundary)
    }

    /// Check physical sense beyond the per-series length checks
    ///
    /// # Errors
    /// Returns `InvalidInput` for temperatures below absolute zero, negative
    /// wind speeds, non-positive pressures or a solar position with only one
    /// of altitude/azimuth.
    pub fn validate(&self) -> Result<()> {
        for series in [
            &self.dry_bulb_temperature,
            &self.shaded_mean_radiant_temperature,
            &self.unshaded_mean_radiant_temperature,
        ] {
            if let Some(hour) = series.values().iter().position(|&v| v < *Celsius::ABSOLUTE_ZERO) {
                return Err(ComfortError::invalid_input(format!(
                    "{} is below absolute zero at hour {hour}",
                    series.name()
                )));
            }
        }
        if let Some(hour) = self.wind_speed.values().iter().position(|&v| v < 0.0) {
            return Err(ComfortError::invalid_input(format!(
                "wind speed is negative at hour {hour}"
            )));
        }
        if let Some(hour) = self
            .atmospheric_pressure
            .values()
            .iter()
            .position(|&v| v <= 0.0)
        {
            return Err(ComfortError::invalid_input(format!(
                "atmospheric pressure is not positive at hour {hour}"
            )));
        }
        if self.solar_altitude.is_some() != self.solar_azimuth.is_some() {
            return Err(ComfortError::invalid_input(
                "solar altitude and azimuth must be given together",
            ));
        }
        Ok(())
    }

    /// True for hours with global horizontal radiation above zero
    pub fn sun_up(&self) -> Vec<bool> {
        self.global_horizontal_radiation
            .values()
            .iter()
            .map(|&ghr| ghr > 0.0)
            .collect()
    }

    /// Distinct (speed, direction) pairs and the state of every hour
    pub fn wind_states(&self) -> WindStates {
        WindStates::from_series(self.wind_speed.values(), self.wind_direction.values())
    }

    /// Mix the weather series into a fingerprint
    pub(crate) fn fingerprint_weather(&self, builder: FingerprintBuilder) -> FingerprintBuilder {
        builder
            .f64s(self.dry_bulb_temperature.values())
            .f64s(self.relative_humidity.values())
            .f64s(self.wind_speed.values())
            .f64s(self.wind_direction.values())
            .f64s(self.atmospheric_pressure.values())
    }

    /// Fingerprint of the series the MRT interpolation reads
    pub(crate) fn mrt_fingerprint(&self) -> Fingerprint {
        Fingerprint::builder()
            .str("boundary_mrt")
            .f64s(self.global_horizontal_radiation.values())
            .f64s(self.shaded_mean_radiant_temperature.values())
            .f64s(self.unshaded_mean_radiant_temperature.values())
            .finish()
    }
}

/// One observed (speed, direction) combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindState {
    pub speed: MetersPerSecond,
    /// Direction the wind blows from, normalised to [0, 360)
    pub direction: Degrees,
}

/// Unique wind states of a year and the index of each hour's state
#[derive(Debug, Clone, PartialEq)]
pub struct WindStates {
    /// Distinct states sorted by (speed, direction)
    pub unique: Vec<WindState>,
    /// `unique[hourly_index[h]]` is the state at hour `h`
    pub hourly_index: Vec<usize>,
}

impl WindStates {
    /// Deduplicate aligned speed/direction series
    ///
    /// States are compared by exact value; directions are wrapped into
    /// [0, 360) first so that 0° and 360° are the same state.
    pub fn from_series(speed: &[f64], direction: &[f64]) -> Self {
        let pairs: Vec<(f64, f64)> = speed
            .iter()
            .zip(direction)
            .map(|(&s, &d)| (s, *Degrees::new(d).normalized()))
            .collect();

        let mut unique = pairs.clone();
        unique.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        unique.dedup_by(|a, b| a.0.to_bits() == b.0.to_bits() && a.1.to_bits() == b.1.to_bits());

        let lookup: FxHashMap<(u64, u64), usize> = unique
            .iter()
            .enumerate()
            .map(|(i, &(s, d))| ((s.to_bits(), d.to_bits()), i))
            .collect();

        // every pair is in `unique`, so the lookup cannot miss
        let hourly_index = pairs
            .iter()
            .map(|&(s, d)| lookup.get(&(s.to_bits(), d.to_bits())).copied().unwrap_or(0))
            .collect();

        Self {
            unique: unique
                .into_iter()
                .map(|(s, d)| WindState {
                    speed: MetersPerSecond::new(s),
                    direction: Degrees::new(d),
                })
                .collect(),
            hourly_index,
        }
    }

    /// Number of distinct states
    pub fn len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }

    /// Mix the states into a fingerprint
    pub(crate) fn fingerprint(&self, builder: FingerprintBuilder) -> FingerprintBuilder {
        let flat: Vec<f64> = self
            .unique
            .iter()
            .flat_map(|w| [*w.speed, *w.direction])
            .collect();
        builder.f64s(&flat).u64(self.hourly_index.len() as u64)
    }
}

/// Boundary conditions with constant weather, for tests and examples
///
/// # Errors
/// Returns `InvalidInput` if any value is not finite.
pub fn constant_boundary(
    dry_bulb: f64,
    relative_humidity: f64,
    wind_speed: f64,
    shaded_mrt: f64,
    unshaded_mrt: f64,
    ghr: f64,
) -> Result<BoundaryConditions> {
    Ok(BoundaryConditions {
        dry_bulb_temperature: HourlyTimeSeries::constant("Dry Bulb Temperature", "C", dry_bulb)?,
        relative_humidity: HourlyTimeSeries::constant("Relative Humidity", "%", relative_humidity)?,
        wind_speed: HourlyTimeSeries::constant("Wind Speed", "m/s", wind_speed)?,
        wind_direction: HourlyTimeSeries::constant("Wind Direction", "degrees", 0.0)?,
        atmospheric_pressure: HourlyTimeSeries::constant("Atmospheric Station Pressure", "Pa", 101_325.0)?,
        global_horizontal_radiation: HourlyTimeSeries::constant("Global Horizontal Radiation", "W/m2", ghr)?,
        shaded_mean_radiant_temperature: HourlyTimeSeries::constant("Shaded MRT", "C", shaded_mrt)?,
        unshaded_mean_radiant_temperature: HourlyTimeSeries::constant("Unshaded MRT", "C", unshaded_mrt)?,
        solar_altitude: None,
        solar_azimuth: None,
    })
}
