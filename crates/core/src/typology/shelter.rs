//! Shelters: partial enclosures described by a patch of sky

use crate::error::{ComfortError, Result};
use serde::{Deserialize, Serialize};

/// A solid or porous surface covering an altitude/azimuth patch of the sky
///
/// Azimuths are degrees clockwise from north. A range whose start exceeds its
/// end wraps through north, e.g. `[337.5, 22.5]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    /// Lowest and highest altitude covered (0-90 degrees)
    pub altitude_range: [f64; 2],
    /// First and last azimuth covered (0-360 degrees)
    pub azimuth_range: [f64; 2],
    /// Fraction of radiation and wind passing through (0 solid, 1 open)
    #[serde(default)]
    pub porosity: f64,
}

impl Shelter {
    /// Check ranges and porosity
    ///
    /// # Errors
    /// Returns `InvalidInput` for an altitude range outside 0-90 or reversed,
    /// an azimuth outside 0-360 or a porosity outside 0-1.
    pub fn validate(&self) -> Result<()> {
        let [alt_lo, alt_hi] = self.altitude_range;
        if !(0.0..=90.0).contains(&alt_lo) || !(0.0..=90.0).contains(&alt_hi) || alt_lo > alt_hi {
            return Err(ComfortError::invalid_input(format!(
                "shelter altitude range must be ordered within 0-90, got {:?}",
                self.altitude_range
            )));
        }
        if self
            .azimuth_range
            .iter()
            .any(|a| !(0.0..=360.0).contains(a))
        {
            return Err(ComfortError::invalid_input(format!(
                "shelter azimuth range must be within 0-360, got {:?}",
                self.azimuth_range
            )));
        }
        if !(0.0..=1.0).contains(&self.porosity) {
            return Err(ComfortError::invalid_input(format!(
                "shelter porosity must be within 0-1, got {}",
                self.porosity
            )));
        }
        Ok(())
    }

    /// Angular width of the azimuth range (degrees)
    pub fn azimuth_span(&self) -> f64 {
        let [start, end] = self.azimuth_range;
        if start <= end {
            end - start
        } else {
            360.0 - start + end
        }
    }

    /// Azimuth range as non-wrapping intervals
    fn azimuth_intervals(&self) -> Vec<(f64, f64)> {
        let [start, end] = self.azimuth_range;
        if start <= end {
            vec![(start, end)]
        } else {
            vec![(start, 360.0), (0.0, end)]
        }
    }

    fn covers_azimuth(&self, azimuth: f64) -> bool {
        if self.azimuth_span() <= 0.0 {
            return false;
        }
        let azimuth = azimuth.rem_euclid(360.0);
        self.azimuth_intervals()
            .iter()
            .any(|&(lo, hi)| azimuth >= lo && azimuth <= hi)
    }

    /// Fraction of the sky hemisphere covered
    ///
    /// The solid angle of an altitude band scales with the difference of the
    /// sines of its bounds.
    pub fn sky_occluded(&self) -> f64 {
        let [alt_lo, alt_hi] = self.altitude_range;
        let band = alt_hi.to_radians().sin() - alt_lo.to_radians().sin();
        (band * self.azimuth_span() / 360.0).clamp(0.0, 1.0)
    }

    /// True if the sun at (`altitude`, `azimuth`) is behind this shelter
    pub fn blocks_sun(&self, altitude: f64, azimuth: f64) -> bool {
        let [alt_lo, alt_hi] = self.altitude_range;
        altitude > 0.0 && altitude >= alt_lo && altitude <= alt_hi && self.covers_azimuth(azimuth)
    }

    /// True if wind from `direction` hits this shelter
    ///
    /// Only shelters that reach down to the ground stop wind.
    pub fn blocks_wind(&self, direction: f64) -> bool {
        let [alt_lo, alt_hi] = self.altitude_range;
        alt_lo <= 0.0 && alt_hi > alt_lo && self.covers_azimuth(direction)
    }

    /// Wind speed behind this shelter
    pub fn effective_wind_speed(&self, speed: f64, direction: f64) -> f64 {
        if self.blocks_wind(direction) {
            speed * self.porosity
        } else {
            speed
        }
    }

    /// True if the two shelters cover a common patch of sky
    ///
    /// Patches that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Shelter) -> bool {
        let alt_lo = self.altitude_range[0].max(other.altitude_range[0]);
        let alt_hi = self.altitude_range[1].min(other.altitude_range[1]);
        if alt_lo >= alt_hi || self.azimuth_span() <= 0.0 || other.azimuth_span() <= 0.0 {
            return false;
        }
        self.azimuth_intervals().iter().any(|&(a_lo, a_hi)| {
            other
                .azimuth_intervals()
                .iter()
                .any(|&(b_lo, b_hi)| a_lo.max(b_lo) < a_hi.min(b_hi))
        })
    }
}

/// Reject any pair of overlapping shelters
///
/// # Errors
/// Returns `InvalidInput` naming the first overlapping pair.
pub fn check_overlaps(shelters: &[Shelter]) -> Result<()> {
    for (i, a) in shelters.iter().enumerate() {
        for (j, b) in shelters.iter().enumerate().skip(i + 1) {
            if a.overlaps(b) {
                return Err(ComfortError::invalid_input(format!(
                    "shelters {i} and {j} overlap"
                )));
            }
        }
    }
    Ok(())
}
