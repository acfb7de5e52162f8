//! Thermal-comfort physics
//!
//! Point-wise models shared by the spatial engine and the typology
//! evaluation: moist-air psychrometrics, evaporative cooling, the UTCI
//! polynomial, activity adjustment and the decay/smoothing primitives.

pub mod decay;
pub mod evaporative;
pub mod met_rate;
pub mod psychrometrics;
pub mod utci;

pub use decay::{decay_rate_smoother, proximity_decay, DecayCurve};
pub use evaporative::{evaporative_cooling_checked, evaporative_cooling_effect};
pub use met_rate::met_rate_adjustment;
pub use psychrometrics::{humidity_ratio, saturation_vapor_pressure, wet_bulb_temperature};
pub use utci::{utci, utci_array, UtciCategory, UTCI_WIND_SPEED_RANGE};
