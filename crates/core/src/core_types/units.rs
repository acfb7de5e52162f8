//! Semantic unit types for type-safe physical quantity handling
//!
//! Newtype wrappers for the handful of quantities that cross the public API of
//! the comfort engine: air and radiant temperatures, humidity, wind speed,
//! compass angles and pressure. Keeping them distinct stops a relative
//! humidity from being passed where a wind speed is expected in the
//! four-argument UTCI and psychrometric functions.
//!
//! # Design Philosophy
//! - All quantities are `f64`; bulk matrices are stored separately as `f32`
//! - `Deref` to the inner float so arithmetic-heavy code stays readable
//! - Total ordering via `total_cmp` (NaN sorts above every value)
//! - Serde support, serialized transparently as the bare number
//!
//! # Usage
//! ```
//! use comfort_sim_core::core_types::units::{Celsius, Degrees, Percent};
//!
//! let t = Celsius::new(25.0);
//! assert!((t.to_kelvin() - 298.15).abs() < 1e-9);
//!
//! let rh = Percent::new(40.0);
//! assert!((rh.as_fraction() - 0.4).abs() < 1e-12);
//!
//! assert_eq!(Degrees::new(-90.0).normalized(), Degrees::new(270.0));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Mul, Sub};

/// Shared boilerplate for the `f64` newtypes below: ordering, deref,
/// conversion from/to `f64`, addition/subtraction and scalar multiplication.
macro_rules! float_newtype {
    ($name:ident) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }
    };
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Temperature in degrees Celsius (air, wet-bulb, radiant or UTCI equivalent)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Celsius(f64);

float_newtype!(Celsius);

impl Celsius {
    /// Absolute zero in Celsius
    pub const ABSOLUTE_ZERO: Celsius = Celsius(-273.15);

    /// Celsius to Kelvin conversion offset (0°C = 273.15 K)
    pub const KELVIN_OFFSET: f64 = 273.15;

    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -Self::KELVIN_OFFSET,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Absolute temperature in Kelvin
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> f64 {
        self.0 + Self::KELVIN_OFFSET
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

// ============================================================================
// HUMIDITY
// ============================================================================

/// Relative humidity in percent (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Percent(f64);

float_newtype!(Percent);

impl Percent {
    /// Saturated air
    pub const SATURATED: Percent = Percent(100.0);

    /// Create a new percentage (not clamped; weather files occasionally exceed 100)
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Percent(value)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Value as a fraction (percent / 100)
    #[inline]
    #[must_use]
    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }

    /// Clamp into the physical 0-100 range
    #[inline]
    #[must_use]
    pub fn clamped(self) -> Self {
        Percent(self.0.clamp(0.0, 100.0))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

// ============================================================================
// WIND
// ============================================================================

/// Wind speed in meters per second (10 m above ground in weather files)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

float_newtype!(MetersPerSecond);

impl MetersPerSecond {
    /// Create a new velocity
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        MetersPerSecond(value)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// True for calm conditions (exactly zero wind)
    #[inline]
    #[must_use]
    pub fn is_calm(self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for MetersPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m/s", self.0)
    }
}

// ============================================================================
// ANGLE
// ============================================================================

/// Compass angle in degrees, clockwise from north (0 = N, 90 = E)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(f64);

float_newtype!(Degrees);

impl Degrees {
    /// Create a new angle (not normalized)
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Wrap into [0, 360)
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Self {
        let wrapped = self.0.rem_euclid(360.0);
        // rem_euclid can return 360.0 for tiny negative inputs
        Degrees(if wrapped >= 360.0 { 0.0 } else { wrapped })
    }

    /// Opposite compass direction
    #[inline]
    #[must_use]
    pub fn opposite(self) -> Self {
        Degrees(self.0 + 180.0).normalized()
    }

    /// Angle in radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

// ============================================================================
// PRESSURE
// ============================================================================

/// Pressure in Pascals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Pascals(f64);

float_newtype!(Pascals);

impl Pascals {
    /// Standard atmosphere at sea level
    pub const STANDARD_ATMOSPHERE: Pascals = Pascals(101_325.0);

    /// Create a new pressure
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Pascals(value)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Pressure in kilopascals
    #[inline]
    #[must_use]
    pub fn to_kpa(self) -> f64 {
        self.0 / 1000.0
    }
}

impl fmt::Display for Pascals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} Pa", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_normalization_wraps() {
        assert_eq!(Degrees::new(360.0).normalized(), Degrees::new(0.0));
        assert_eq!(Degrees::new(-1.0).normalized(), Degrees::new(359.0));
        assert_eq!(Degrees::new(725.0).normalized(), Degrees::new(5.0));
        assert_eq!(Degrees::new(350.0).opposite(), Degrees::new(170.0));
    }

    #[test]
    fn test_total_ordering() {
        let mut temps = vec![Celsius::new(30.0), Celsius::new(-5.0), Celsius::new(12.0)];
        temps.sort();
        assert_eq!(temps[0], Celsius::new(-5.0));
        assert_eq!(temps[2], Celsius::new(30.0));
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(Percent::new(120.0).clamped(), Percent::SATURATED);
        assert!((Percent::new(55.0).as_fraction() - 0.55).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "below absolute zero")]
    fn test_celsius_rejects_below_absolute_zero() {
        let _ = Celsius::new(-300.0);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&MetersPerSecond::new(3.5)).unwrap();
        assert_eq!(json, "3.5");
        let back: MetersPerSecond = serde_json::from_str(&json).unwrap();
        assert!(!back.is_calm());
    }
}
