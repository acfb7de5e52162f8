//! Moist-air psychrometrics
//!
//! Saturation pressure, humidity ratio and thermodynamic wet-bulb temperature
//! for ordinary outdoor conditions.
//!
//! # Scientific References
//! - ASHRAE (2017). "Psychrometrics", ASHRAE Handbook - Fundamentals, Chapter 1.
//!   Equations 5-6 (saturation pressure), 20 & 22 (humidity ratio),
//!   33 & 35 (wet-bulb relations).
//! - Hyland, R.W. & Wexler, A. (1983). "Formulations for the thermodynamic
//!   properties of the saturated phases of H2O from 173.15 K to 473.15 K."
//!   ASHRAE Transactions 89(2A), 500-519.

use crate::core_types::units::{Celsius, Pascals, Percent};

/// Ratio of molecular masses of water vapour and dry air
const MOLECULAR_MASS_RATIO: f64 = 0.621945;

/// Lowest temperature used to bracket the wet-bulb search (°C)
const WET_BULB_SEARCH_FLOOR: f64 = -100.0;

/// Bisection stops once the bracket is narrower than this (°C)
const WET_BULB_TOLERANCE: f64 = 1e-9;

const MAX_BISECTION_STEPS: usize = 200;

/// Saturation vapour pressure over ice (below 0°C) or liquid water
///
/// Hyland-Wexler formulation as tabulated by ASHRAE (2017), Eq. 5 and 6.
///
/// # Arguments
/// * `temperature` - Dry-bulb temperature
///
/// # Returns
/// Saturation pressure of water vapour (Pa)
pub fn saturation_vapor_pressure(temperature: Celsius) -> Pascals {
    let t = temperature.to_kelvin();
    let ln_pws = if *temperature < 0.0 {
        -5.674_535_9e3 / t + 6.392_524_7 - 9.677_843_0e-3 * t + 6.221_570_1e-7 * t * t
            + 2.074_782_5e-9 * t.powi(3)
            - 9.484_024_0e-13 * t.powi(4)
            + 4.163_501_9 * t.ln()
    } else {
        -5.800_220_6e3 / t + 1.391_499_3 - 4.864_023_9e-2 * t + 4.176_476_8e-5 * t * t
            - 1.445_209_3e-8 * t.powi(3)
            + 6.545_967_3 * t.ln()
    };
    Pascals::new(ln_pws.exp())
}

/// Humidity ratio of moist air (kg water / kg dry air)
///
/// # Arguments
/// * `dry_bulb` - Dry-bulb temperature
/// * `relative_humidity` - Relative humidity (clamped to 0-100%)
/// * `pressure` - Atmospheric pressure
pub fn humidity_ratio(dry_bulb: Celsius, relative_humidity: Percent, pressure: Pascals) -> f64 {
    let partial = relative_humidity.clamped().as_fraction() * *saturation_vapor_pressure(dry_bulb);
    humidity_ratio_from_partial_pressure(partial, *pressure)
}

fn humidity_ratio_from_partial_pressure(partial_pressure: f64, pressure: f64) -> f64 {
    let dry_air_pressure = pressure - partial_pressure;
    if dry_air_pressure <= 0.0 {
        return f64::INFINITY;
    }
    MOLECULAR_MASS_RATIO * partial_pressure / dry_air_pressure
}

/// Humidity ratio implied by a candidate wet-bulb temperature (ASHRAE Eq. 33/35)
fn humidity_ratio_at_wet_bulb(dry_bulb: f64, wet_bulb: f64, pressure: f64) -> f64 {
    let pws_star = *saturation_vapor_pressure(Celsius::from(wet_bulb));
    let ws_star = humidity_ratio_from_partial_pressure(pws_star, pressure);
    if wet_bulb >= 0.0 {
        ((2501.0 - 2.326 * wet_bulb) * ws_star - 1.006 * (dry_bulb - wet_bulb))
            / (2501.0 + 1.86 * dry_bulb - 4.186 * wet_bulb)
    } else {
        ((2830.0 - 0.24 * wet_bulb) * ws_star - 1.006 * (dry_bulb - wet_bulb))
            / (2830.0 + 1.86 * dry_bulb - 2.1 * wet_bulb)
    }
}

/// Thermodynamic wet-bulb temperature
///
/// The implied humidity ratio grows monotonically with the candidate wet-bulb
/// temperature, so the root is bracketed between -100°C and the dry-bulb
/// temperature and found by bisection.
///
/// # Arguments
/// * `dry_bulb` - Dry-bulb temperature
/// * `relative_humidity` - Relative humidity (clamped to 0-100%)
/// * `pressure` - Atmospheric pressure
///
/// # Returns
/// Wet-bulb temperature, never above `dry_bulb`
pub fn wet_bulb_temperature(
    dry_bulb: Celsius,
    relative_humidity: Percent,
    pressure: Pascals,
) -> Celsius {
    let target = humidity_ratio(dry_bulb, relative_humidity, pressure);
    let t = *dry_bulb;
    let p = *pressure;

    let mut low = WET_BULB_SEARCH_FLOOR.min(t);
    let mut high = t;
    for _ in 0..MAX_BISECTION_STEPS {
        if high - low < WET_BULB_TOLERANCE {
            break;
        }
        let mid = 0.5 * (low + high);
        if humidity_ratio_at_wet_bulb(t, mid, p) > target {
            high = mid;
        } else {
            low = mid;
        }
    }
    Celsius::from(0.5 * (low + high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_saturation_pressure_reference_values() {
        // ASHRAE Table 3: 20°C -> 2.3389 kPa, 0.01°C ~ 0.6117 kPa
        assert_relative_eq!(
            *saturation_vapor_pressure(Celsius::new(20.0)),
            2338.8,
            epsilon = 1.0
        );
        assert_relative_eq!(
            *saturation_vapor_pressure(Celsius::new(0.01)),
            611.7,
            epsilon = 1.0
        );
    }

    #[test]
    fn test_wet_bulb_chart_values() {
        let p = Pascals::STANDARD_ATMOSPHERE;
        let wb = wet_bulb_temperature(Celsius::new(25.0), Percent::new(50.0), p);
        assert_relative_eq!(*wb, 17.89, epsilon = 0.05);

        let wb = wet_bulb_temperature(Celsius::new(30.0), Percent::new(40.0), p);
        assert_relative_eq!(*wb, 20.06, epsilon = 0.05);
    }

    #[test]
    fn test_wet_bulb_equals_dry_bulb_when_saturated() {
        let wb = wet_bulb_temperature(
            Celsius::new(20.0),
            Percent::SATURATED,
            Pascals::STANDARD_ATMOSPHERE,
        );
        assert_relative_eq!(*wb, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wet_bulb_never_exceeds_dry_bulb() {
        for t in [-15.0, -2.0, 0.0, 12.0, 28.0, 41.0] {
            for rh in [0.0, 10.0, 45.0, 90.0, 100.0, 110.0] {
                let wb =
                    wet_bulb_temperature(Celsius::new(t), Percent::new(rh), Pascals::new(95_000.0));
                assert!(*wb <= t + 1e-9, "wb {} > db {} at rh {}", *wb, t, rh);
            }
        }
    }
}
