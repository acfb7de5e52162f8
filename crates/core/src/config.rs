//! Engine configuration
//!
//! Every tunable the engine uses lives here instead of in code: the moisture
//! plume geometry, the MRT transition smoother, UTCI input clamps, comfort
//! limits, worker-pool size and cache policy. The simulation directory itself
//! is always supplied by the caller; no installation paths are baked in.

use crate::cache::CachePolicy;
use crate::error::{ComfortError, Result};
use crate::physics::decay::DecayCurve;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// UTCI range regarded as "no thermal stress" (°C)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortLimits {
    /// Lower bound, inclusive
    pub low: f64,
    /// Upper bound, inclusive
    pub high: f64,
}

impl ComfortLimits {
    /// Create validated limits
    ///
    /// # Errors
    /// Returns `InvalidInput` unless both bounds are finite and `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        let limits = Self { low, high };
        limits.validate()?;
        Ok(limits)
    }

    /// Check that both bounds are finite and ordered
    ///
    /// # Errors
    /// Returns `InvalidInput` on non-finite or unordered bounds.
    pub fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(ComfortError::invalid_input(format!(
                "comfort limits must be finite with low < high, got [{}, {}]",
                self.low, self.high
            )));
        }
        Ok(())
    }

    /// True if `value` lies within the limits (inclusive)
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

impl Default for ComfortLimits {
    fn default() -> Self {
        Self {
            low: 9.0,
            high: 26.0,
        }
    }
}

/// Parameters of the shade/sun transition smoother applied to MRT series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmootherConfig {
    /// Hour-over-hour drop that counts as a transition (positive number)
    pub difference_threshold: f64,
    /// Hours, starting at the transition, that receive the smoothed value
    pub transition_window: usize,
    /// Span of the exponentially weighted mean
    pub ewm_span: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            difference_threshold: 10.0,
            transition_window: 4,
            ewm_span: 1.25,
        }
    }
}

/// Geometry of the moisture plume around each emitter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlumeConfig {
    /// Influence radius in calm conditions (model units)
    pub calm_radius: f64,
    /// Influence radius per m/s of wind speed
    pub wind_speed_radius_multiplier: f64,
    /// Full angular width of the downwind plume (degrees)
    pub angle_width: f64,
    /// Shape of the radial decay
    pub decay_curve: DecayCurve,
}

impl PlumeConfig {
    /// Half of the plume width, applied either side of the downwind bearing
    #[inline]
    pub fn half_width(&self) -> f64 {
        self.angle_width / 2.0
    }
}

impl Default for PlumeConfig {
    fn default() -> Self {
        Self {
            calm_radius: 5.0,
            wind_speed_radius_multiplier: 10.0,
            angle_width: 12.0,
            decay_curve: DecayCurve::Parabolic,
        }
    }
}

/// Top-level configuration for spatial and typology evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Moisture plume geometry
    pub plume: PlumeConfig,
    /// MRT transition smoother
    pub smoother: SmootherConfig,
    /// Wind speeds fed to UTCI are clamped into this range (m/s)
    pub utci_wind_speed_range: (f64, f64),
    /// UTCI comfort band
    pub comfort_limits: ComfortLimits,
    /// Worker threads for typology fan-out (0 = one per core)
    pub worker_threads: usize,
    /// How cache entries are trusted
    pub cache_policy: CachePolicy,
    /// Delete `initial_results` folders left by the radiance run
    pub remove_temp_files: bool,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            plume: PlumeConfig::default(),
            smoother: SmootherConfig::default(),
            utci_wind_speed_range: (0.0, 17.0),
            comfort_limits: ComfortLimits::default(),
            worker_threads: 0,
            cache_policy: CachePolicy::default(),
            remove_temp_files: true,
        }
    }
}

impl SpatialConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or fails validation.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check all parameters for physical sense
    ///
    /// # Errors
    /// Returns `InvalidInput` describing the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        self.comfort_limits.validate()?;

        let plume = &self.plume;
        if !(plume.calm_radius.is_finite() && plume.calm_radius >= 0.0) {
            return Err(ComfortError::invalid_input(format!(
                "calm plume radius must be >= 0, got {}",
                plume.calm_radius
            )));
        }
        if !(plume.wind_speed_radius_multiplier.is_finite()
            && plume.wind_speed_radius_multiplier >= 0.0)
        {
            return Err(ComfortError::invalid_input(format!(
                "plume radius multiplier must be >= 0, got {}",
                plume.wind_speed_radius_multiplier
            )));
        }
        if !(plume.angle_width > 0.0 && plume.angle_width <= 360.0) {
            return Err(ComfortError::invalid_input(format!(
                "plume angle width must be in (0, 360], got {}",
                plume.angle_width
            )));
        }

        if self.smoother.ewm_span.is_nan() || self.smoother.ewm_span < 1.0 {
            return Err(ComfortError::invalid_input(format!(
                "smoother span must be >= 1, got {}",
                self.smoother.ewm_span
            )));
        }

        let (lo, hi) = self.utci_wind_speed_range;
        if !(lo.is_finite() && hi.is_finite() && lo >= 0.0 && lo < hi) {
            return Err(ComfortError::invalid_input(format!(
                "UTCI wind speed range must satisfy 0 <= low < high, got ({lo}, {hi})"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SpatialConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.plume.half_width(), 6.0);
        assert_eq!(config.smoother.transition_window, 4);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: SpatialConfig =
            serde_json::from_str(r#"{ "worker_threads": 2, "remove_temp_files": false }"#)
                .unwrap();
        assert_eq!(config.worker_threads, 2);
        assert!(!config.remove_temp_files);
        assert_eq!(config.plume, PlumeConfig::default());
    }

    #[test]
    fn test_comfort_limits_validation() {
        assert!(ComfortLimits::new(9.0, 26.0).is_ok());
        assert!(ComfortLimits::new(26.0, 9.0).is_err());
        assert!(ComfortLimits::new(f64::NAN, 9.0).is_err());
        let limits = ComfortLimits::default();
        assert!(limits.contains(9.0));
        assert!(limits.contains(26.0));
        assert!(!limits.contains(26.01));
    }

    #[test]
    fn test_rejects_bad_plume() {
        let mut config = SpatialConfig::default();
        config.plume.angle_width = 0.0;
        assert!(config.validate().is_err());
    }
}
