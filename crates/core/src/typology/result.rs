//! Hourly comfort inside a typology

use crate::config::SpatialConfig;
use crate::core_types::units::{Celsius, Pascals, Percent};
use crate::error::{ComfortError, Result};
use crate::physics::{decay_rate_smoother, evaporative_cooling_effect, met_rate_adjustment, utci_array};
use crate::typology::catalog::Typology;
use crate::typology::summary::UtciSummary;
use crate::weather::{AnalysisPeriod, BoundaryConditions, HourlyTimeSeries, HOURS_PER_YEAR};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Annual hourly conditions experienced within one typology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypologyResult {
    pub typology: Typology,
    pub dry_bulb_temperature: HourlyTimeSeries,
    pub relative_humidity: HourlyTimeSeries,
    pub wind_speed: HourlyTimeSeries,
    pub mean_radiant_temperature: HourlyTimeSeries,
    pub universal_thermal_climate_index: HourlyTimeSeries,
}

impl TypologyResult {
    /// Evaluate `typology` against the boundary conditions
    ///
    /// By day the MRT sits between the shaded and unshaded bounds according
    /// to how much of the sun the shelters let through; without a solar
    /// position, and at night, the effective sky visibility is used instead.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an invalid typology or boundary conditions;
    /// propagates UTCI errors.
    pub fn evaluate(
        typology: &Typology,
        boundary: &BoundaryConditions,
        config: &SpatialConfig,
    ) -> Result<Self> {
        typology.validate()?;
        boundary.validate()?;
        info!(typology = %typology.name, "Calculating typology result");

        let dbt = boundary.dry_bulb_temperature.values();
        let rh = boundary.relative_humidity.values();
        let pressure = boundary.atmospheric_pressure.values();
        let (cooled_dbt, cooled_rh): (Vec<f64>, Vec<f64>) = (0..HOURS_PER_YEAR)
            .map(|h| {
                let (t, r) = evaporative_cooling_effect(
                    Celsius::new(dbt[h]),
                    Percent::new(rh[h]),
                    typology.evaporative_cooling_effectiveness,
                    Pascals::new(pressure[h]),
                );
                (*t, *r)
            })
            .unzip();

        let wind_speed: Vec<f64> = boundary
            .wind_speed
            .values()
            .iter()
            .zip(boundary.wind_direction.values())
            .map(|(&speed, &direction)| typology.effective_wind_speed(speed, direction))
            .collect();

        let mrt = Self::mean_radiant_temperature(typology, boundary, config);

        let utci = utci_array(&cooled_dbt, &mrt, &wind_speed, &cooled_rh, config.utci_wind_speed_range)?;

        debug!(typology = %typology.name, "Typology result complete");
        Ok(Self {
            typology: typology.clone(),
            dry_bulb_temperature: HourlyTimeSeries::new("Dry Bulb Temperature", "C", cooled_dbt)?,
            relative_humidity: HourlyTimeSeries::new("Relative Humidity", "%", cooled_rh)?,
            wind_speed: HourlyTimeSeries::new("Wind Speed", "m/s", wind_speed)?,
            mean_radiant_temperature: HourlyTimeSeries::new("Mean Radiant Temperature", "C", mrt)?,
            universal_thermal_climate_index: HourlyTimeSeries::new(
                "Universal Thermal Climate Index",
                "C",
                utci,
            )?,
        })
    }

    fn mean_radiant_temperature(
        typology: &Typology,
        boundary: &BoundaryConditions,
        config: &SpatialConfig,
    ) -> Vec<f64> {
        let shaded = boundary.shaded_mean_radiant_temperature.values();
        let unshaded = boundary.unshaded_mean_radiant_temperature.values();
        let sun_up = boundary.sun_up();
        let sky_visibility = typology.sky_visibility();
        let solar_position = boundary
            .solar_altitude
            .as_ref()
            .zip(boundary.solar_azimuth.as_ref());

        let raw: Vec<f64> = (0..HOURS_PER_YEAR)
            .map(|h| {
                let exposure = if sun_up[h] {
                    solar_position
                        .and_then(|(alt, az)| typology.sun_exposure(alt[h], az[h]))
                        .unwrap_or(sky_visibility)
                } else {
                    sky_visibility
                };
                shaded[h] + exposure * (unshaded[h] - shaded[h])
            })
            .collect();

        let smoother = &config.smoother;
        decay_rate_smoother(
            &raw,
            smoother.difference_threshold,
            smoother.transition_window,
            smoother.ewm_span,
        )
    }

    /// Comfort summary of the UTCI over `period` using the configured limits
    ///
    /// # Errors
    /// Returns `InvalidInput` for invalid comfort limits.
    pub fn summary(&self, period: &AnalysisPeriod, config: &SpatialConfig) -> Result<UtciSummary> {
        UtciSummary::describe(
            self.universal_thermal_climate_index.values(),
            period,
            &config.comfort_limits,
        )
    }

    /// UTCI as felt at metabolic rate `met`
    ///
    /// # Errors
    /// Returns `InvalidInput` for a MET outside the supported range.
    pub fn utci_at_met(&self, met: f64) -> Result<Vec<f64>> {
        met_rate_adjustment(self.universal_thermal_climate_index.values(), met)
    }
}

/// Evaluate typologies on a bounded worker pool
///
/// The pool has `config.worker_threads` workers (0 lets rayon choose). Inputs
/// are shared read-only and results come back in the order given.
///
/// # Errors
/// Returns `InvalidInput` if the pool cannot be built; otherwise the first
/// typology error.
pub fn evaluate_typologies(
    typologies: &[Typology],
    boundary: &BoundaryConditions,
    config: &SpatialConfig,
) -> Result<Vec<TypologyResult>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build()
        .map_err(|e| ComfortError::invalid_input(format!("cannot build worker pool: {e}")))?;
    info!(
        typologies = typologies.len(),
        workers = pool.current_num_threads(),
        "Evaluating typologies"
    );
    pool.install(|| {
        typologies
            .par_iter()
            .map(|t| TypologyResult::evaluate(t, boundary, config))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typology::catalog::TypologyCatalog;
    use crate::weather::constant_boundary;
    use approx::assert_relative_eq;

    #[test]
    fn test_openfield_matches_boundary() {
        let boundary = constant_boundary(20.0, 50.0, 1.0, 20.0, 20.0, 0.0).unwrap();
        let result =
            TypologyResult::evaluate(&Typology::openfield(), &boundary, &SpatialConfig::default()).unwrap();
        assert_eq!(result.dry_bulb_temperature[10], 20.0);
        assert_eq!(result.relative_humidity[10], 50.0);
        assert_eq!(result.wind_speed[10], 1.0);
        assert_relative_eq!(result.mean_radiant_temperature[10], 20.0);
        assert_relative_eq!(result.universal_thermal_climate_index[10], 19.4, epsilon = 0.1);
    }

    #[test]
    fn test_boundary_below_absolute_zero_is_an_error() {
        let boundary = constant_boundary(-300.0, 50.0, 1.0, 20.0, 40.0, 0.0).unwrap();
        let err = TypologyResult::evaluate(&Typology::openfield(), &boundary, &SpatialConfig::default())
            .unwrap_err();
        assert!(matches!(err, ComfortError::InvalidInput { .. }));
    }

    #[test]
    fn test_enclosure_follows_shaded_mrt() {
        let boundary = constant_boundary(25.0, 50.0, 2.0, 25.0, 45.0, 300.0).unwrap();
        let catalog = TypologyCatalog::presets().unwrap();
        let config = SpatialConfig::default();

        let enclosed = TypologyResult::evaluate(catalog.get("Enclosed").unwrap(), &boundary, &config).unwrap();
        let open = TypologyResult::evaluate(catalog.get("Openfield").unwrap(), &boundary, &config).unwrap();
        let porous =
            TypologyResult::evaluate(catalog.get("Porous enclosure").unwrap(), &boundary, &config).unwrap();

        assert_relative_eq!(enclosed.mean_radiant_temperature[500], 25.0, epsilon = 1e-9);
        assert_relative_eq!(open.mean_radiant_temperature[500], 45.0, epsilon = 1e-9);
        assert_relative_eq!(porous.mean_radiant_temperature[500], 35.0, epsilon = 1e-9);
        assert_eq!(enclosed.wind_speed[500], 0.0);
        assert_eq!(porous.wind_speed[500], 1.0);
    }

    #[test]
    fn test_misting_cools_and_humidifies() {
        let boundary = constant_boundary(35.0, 20.0, 2.0, 35.0, 50.0, 0.0).unwrap();
        let catalog = TypologyCatalog::presets().unwrap();
        let misting =
            TypologyResult::evaluate(catalog.get("Misting").unwrap(), &boundary, &SpatialConfig::default())
                .unwrap();
        assert!(misting.dry_bulb_temperature[0] < 35.0);
        assert_relative_eq!(misting.relative_humidity[0], 20.0 * 0.7 + 30.0, epsilon = 1e-9);
        assert_eq!(misting.wind_speed[0], 1.0);
    }

    #[test]
    fn test_sun_position_drives_daytime_exposure() {
        let mut boundary = constant_boundary(25.0, 50.0, 1.0, 25.0, 45.0, 300.0).unwrap();
        boundary.solar_altitude = Some(HourlyTimeSeries::constant("Solar Altitude", "degrees", 30.0).unwrap());
        boundary.solar_azimuth = Some(HourlyTimeSeries::constant("Solar Azimuth", "degrees", 180.0).unwrap());
        let catalog = TypologyCatalog::presets().unwrap();
        let config = SpatialConfig::default();

        let south = TypologyResult::evaluate(catalog.get("South shelter").unwrap(), &boundary, &config).unwrap();
        let north = TypologyResult::evaluate(catalog.get("North shelter").unwrap(), &boundary, &config).unwrap();
        assert_relative_eq!(south.mean_radiant_temperature[100], 25.0, epsilon = 1e-9);
        assert_relative_eq!(north.mean_radiant_temperature[100], 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fan_out_preserves_order() {
        let boundary = constant_boundary(22.0, 60.0, 3.0, 22.0, 40.0, 100.0).unwrap();
        let catalog = TypologyCatalog::presets().unwrap();
        let typologies = &catalog.typologies()[..6];

        for workers in [1, 3] {
            let config = SpatialConfig {
                worker_threads: workers,
                ..SpatialConfig::default()
            };
            let results = evaluate_typologies(typologies, &boundary, &config).unwrap();
            let names: Vec<&str> = results.iter().map(|r| r.typology.name.as_str()).collect();
            let expected: Vec<&str> = typologies.iter().map(|t| t.name.as_str()).collect();
            assert_eq!(names, expected);
        }
    }

    #[test]
    fn test_met_adjustment_and_summary() {
        let boundary = constant_boundary(20.0, 50.0, 1.0, 20.0, 20.0, 0.0).unwrap();
        let config = SpatialConfig::default();
        let result = TypologyResult::evaluate(&Typology::openfield(), &boundary, &config).unwrap();

        let summary = result.summary(&AnalysisPeriod::whole_year(), &config).unwrap();
        assert_eq!(summary.comfortable_hours, HOURS_PER_YEAR);

        let adjusted = result.utci_at_met(2.3).unwrap();
        assert!((adjusted[0] - result.universal_thermal_climate_index[0]).abs() <= 0.16 + 1e-9);
        assert!(result.utci_at_met(1.0).is_err());
    }
}
