//! Annual hourly series

use crate::error::{ComfortError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Hours in the non-leap reference year
pub const HOURS_PER_YEAR: usize = 8760;

/// Days in each month of the non-leap reference year
pub const DAYS_PER_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Month (1-12) containing `hour_of_year` (0-8759)
///
/// Hours past the end of the year are reported as December.
pub fn month_of_hour(hour_of_year: usize) -> u32 {
    let mut remaining = hour_of_year / 24;
    for (i, days) in DAYS_PER_MONTH.iter().enumerate() {
        if remaining < *days {
            return i as u32 + 1;
        }
        remaining -= days;
    }
    12
}

/// Hour of the day (0-23) of `hour_of_year`
#[inline]
pub fn hour_of_day(hour_of_year: usize) -> u32 {
    (hour_of_year % 24) as u32
}

#[derive(Deserialize)]
struct RawSeries {
    name: String,
    #[serde(default)]
    unit: String,
    values: Vec<f64>,
}

impl TryFrom<RawSeries> for HourlyTimeSeries {
    type Error = ComfortError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        HourlyTimeSeries::new(raw.name, raw.unit, raw.values)
    }
}

/// Exactly one value per hour of the reference year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct HourlyTimeSeries {
    name: String,
    unit: String,
    values: Vec<f64>,
}

impl HourlyTimeSeries {
    /// Create a series, rejecting anything but 8760 finite values
    ///
    /// # Errors
    /// Returns `InvalidInput` on a wrong length or a non-finite value.
    pub fn new(name: impl Into<String>, unit: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != HOURS_PER_YEAR {
            return Err(ComfortError::invalid_input(format!(
                "series '{name}' has {} values, expected {HOURS_PER_YEAR}",
                values.len()
            )));
        }
        if let Some(hour) = values.iter().position(|v| !v.is_finite()) {
            return Err(ComfortError::invalid_input(format!(
                "series '{name}' has a non-finite value at hour {hour}"
            )));
        }
        Ok(Self {
            name,
            unit: unit.into(),
            values,
        })
    }

    /// The same value for every hour
    ///
    /// # Errors
    /// Returns `InvalidInput` if `value` is not finite.
    pub fn constant(name: impl Into<String>, unit: impl Into<String>, value: f64) -> Result<Self> {
        Self::new(name, unit, vec![value; HOURS_PER_YEAR])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// New series with `f` applied to every value
    ///
    /// # Errors
    /// Returns `InvalidInput` if `f` produces a non-finite value.
    pub fn map<F: Fn(f64) -> f64>(&self, name: impl Into<String>, f: F) -> Result<Self> {
        Self::new(name, self.unit.clone(), self.values.iter().map(|&v| f(v)).collect())
    }

    /// Mean of the values at the given hours (NaN if `hours` is empty)
    pub fn mean_over(&self, hours: &[usize]) -> f64 {
        if hours.is_empty() {
            return f64::NAN;
        }
        hours.iter().map(|&h| self.values[h]).sum::<f64>() / hours.len() as f64
    }
}

impl Index<usize> for HourlyTimeSeries {
    type Output = f64;

    fn index(&self, hour: usize) -> &f64 {
        &self.values[hour]
    }
}
