//! Weather and boundary-condition inputs
//!
//! Everything here is indexed by hour of a non-leap reference year
//! (0-8759, 1 January 00:00 first).

pub mod analysis_period;
pub mod boundary;
pub mod series;

pub use analysis_period::{validate_hour, validate_month, AnalysisPeriod};
pub use boundary::{constant_boundary, BoundaryConditions, WindState, WindStates};
pub use series::{hour_of_day, month_of_hour, HourlyTimeSeries, DAYS_PER_MONTH, HOURS_PER_YEAR};
