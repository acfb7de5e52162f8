//! Evaporative cooling effect
//!
//! Moves an air state part of the way along the wet-bulb line towards
//! saturation. The effectiveness `e` is the fraction of the dry-bulb/wet-bulb
//! depression that is removed: 0 leaves the air untouched, 1 saturates it.
//!
//! ```text
//! DBT' = DBT - e × (DBT - WBT)
//! RH'  = RH × (1 - e) + 100 × e
//! ```
//!
//! If RH' would exceed 100% the state is pinned at saturation (RH' = 100%,
//! DBT' = WBT).

use crate::core_types::units::{Celsius, Pascals, Percent};
use crate::error::{ComfortError, Result};
use crate::physics::psychrometrics::wet_bulb_temperature;

/// Apply an evaporative cooling effectiveness to one air state
///
/// # Arguments
/// * `dry_bulb` - Ambient dry-bulb temperature
/// * `relative_humidity` - Ambient relative humidity
/// * `effectiveness` - Evaporative cooling effectiveness (0-1)
/// * `pressure` - Atmospheric pressure
///
/// # Returns
/// Adjusted `(dry_bulb, relative_humidity)`
pub fn evaporative_cooling_effect(
    dry_bulb: Celsius,
    relative_humidity: Percent,
    effectiveness: f64,
    pressure: Pascals,
) -> (Celsius, Percent) {
    if effectiveness == 0.0 {
        return (dry_bulb, relative_humidity);
    }
    let wet_bulb = wet_bulb_temperature(dry_bulb, relative_humidity, pressure);
    apply_with_wet_bulb(dry_bulb, relative_humidity, wet_bulb, effectiveness)
}

/// Same as [`evaporative_cooling_effect`], rejecting effectiveness outside [0, 1]
///
/// # Errors
/// Returns `InvalidInput` if `effectiveness` is not within [0, 1].
pub fn evaporative_cooling_checked(
    dry_bulb: Celsius,
    relative_humidity: Percent,
    effectiveness: f64,
    pressure: Pascals,
) -> Result<(Celsius, Percent)> {
    if !(0.0..=1.0).contains(&effectiveness) {
        return Err(ComfortError::invalid_input(format!(
            "evaporative cooling effectiveness must be between 0 and 1, got {effectiveness}"
        )));
    }
    Ok(evaporative_cooling_effect(
        dry_bulb,
        relative_humidity,
        effectiveness,
        pressure,
    ))
}

/// Evaporative adjustment when the wet-bulb temperature is already known
///
/// The spatial engine evaluates one wet-bulb per hour and reuses it for every
/// sensor point in that hour.
pub(crate) fn apply_with_wet_bulb(
    dry_bulb: Celsius,
    relative_humidity: Percent,
    wet_bulb: Celsius,
    effectiveness: f64,
) -> (Celsius, Percent) {
    if effectiveness == 0.0 {
        return (dry_bulb, relative_humidity);
    }
    let new_rh = *relative_humidity * (1.0 - effectiveness) + 100.0 * effectiveness;
    if new_rh > 100.0 {
        return (wet_bulb, Percent::SATURATED);
    }
    let new_dbt = *dry_bulb - effectiveness * (*dry_bulb - *wet_bulb);
    (Celsius::from(new_dbt), Percent::new(new_rh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: Pascals = Pascals::STANDARD_ATMOSPHERE;

    #[test]
    fn test_zero_effectiveness_is_identity() {
        let (dbt, rh) = evaporative_cooling_effect(Celsius::new(31.7), Percent::new(23.4), 0.0, P);
        assert_eq!(dbt, Celsius::new(31.7));
        assert_eq!(rh, Percent::new(23.4));
    }

    #[test]
    fn test_full_effectiveness_saturates() {
        let db = Celsius::new(30.0);
        let rh = Percent::new(40.0);
        let wb = wet_bulb_temperature(db, rh, P);
        let (dbt, new_rh) = evaporative_cooling_effect(db, rh, 1.0, P);
        assert_relative_eq!(*dbt, *wb, epsilon = 1e-9);
        assert_relative_eq!(*new_rh, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_partial_effectiveness() {
        let db = Celsius::new(30.0);
        let rh = Percent::new(40.0);
        let wb = wet_bulb_temperature(db, rh, P);
        let (dbt, new_rh) = evaporative_cooling_effect(db, rh, 0.3, P);
        assert_relative_eq!(*dbt, 30.0 - 0.3 * (30.0 - *wb), epsilon = 1e-9);
        assert_relative_eq!(*new_rh, 40.0 * 0.7 + 30.0, epsilon = 1e-9);
        assert!(*dbt < 30.0);
    }

    #[test]
    fn test_supersaturated_input_clamps_to_wet_bulb() {
        // 105% ambient pushes the adjusted value past 100%
        let db = Celsius::new(18.0);
        let wb = Celsius::new(17.5);
        let (dbt, rh) = apply_with_wet_bulb(db, Percent::new(105.0), wb, 0.2);
        assert_eq!(rh, Percent::SATURATED);
        assert_eq!(dbt, wb);
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        assert!(evaporative_cooling_checked(Celsius::new(20.0), Percent::new(50.0), 1.2, P).is_err());
        assert!(evaporative_cooling_checked(Celsius::new(20.0), Percent::new(50.0), -0.1, P).is_err());
        assert!(evaporative_cooling_checked(Celsius::new(20.0), Percent::new(50.0), 0.5, P).is_ok());
    }
}
