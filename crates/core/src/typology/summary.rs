//! Comfort summaries of UTCI series

use crate::config::ComfortLimits;
use crate::error::{ComfortError, Result};
use crate::weather::{AnalysisPeriod, HOURS_PER_YEAR};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts of comfortable, hot and cold hours in an analysis period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtciSummary {
    /// Label of the analysis period
    pub period: String,
    pub limits: ComfortLimits,
    pub hours: usize,
    /// Hours within the limits (inclusive)
    pub comfortable_hours: usize,
    /// Hours above the upper limit
    pub hot_hours: usize,
    /// Hours below the lower limit
    pub cold_hours: usize,
}

impl UtciSummary {
    /// Summarise an annual hourly UTCI series over `period`
    ///
    /// # Errors
    /// Returns `InvalidInput` for invalid limits or a series that does not
    /// cover 8760 hours.
    pub fn describe(values: &[f64], period: &AnalysisPeriod, limits: &ComfortLimits) -> Result<Self> {
        limits.validate()?;
        if values.len() != HOURS_PER_YEAR {
            return Err(ComfortError::invalid_input(format!(
                "UTCI series has {} values, expected {HOURS_PER_YEAR}",
                values.len()
            )));
        }
        let hours = period.hours_of_year();
        let mut summary = Self {
            period: period.describe(),
            limits: *limits,
            hours: hours.len(),
            comfortable_hours: 0,
            hot_hours: 0,
            cold_hours: 0,
        };
        for h in hours {
            let v = values[h];
            if v > limits.high {
                summary.hot_hours += 1;
            } else if v < limits.low {
                summary.cold_hours += 1;
            } else {
                summary.comfortable_hours += 1;
            }
        }
        Ok(summary)
    }

    fn fraction(&self, count: usize) -> f64 {
        if self.hours == 0 {
            0.0
        } else {
            count as f64 / self.hours as f64
        }
    }

    pub fn comfortable_fraction(&self) -> f64 {
        self.fraction(self.comfortable_hours)
    }

    pub fn hot_fraction(&self) -> f64 {
        self.fraction(self.hot_hours)
    }

    pub fn cold_fraction(&self) -> f64 {
        self.fraction(self.cold_hours)
    }
}

impl fmt::Display for UtciSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "No thermal stress is UTCI between {}°C and {}°C.",
            self.limits.low, self.limits.high
        )?;
        writeln!(
            f,
            "For {}, \"No thermal stress\" is expected for {} out of a possible {} hours ({:.1}%).",
            self.period,
            self.comfortable_hours,
            self.hours,
            self.comfortable_fraction() * 100.0
        )?;
        writeln!(
            f,
            "\"Cold stress\" is expected for {} hours ({:.1}%).",
            self.cold_hours,
            self.cold_fraction() * 100.0
        )?;
        write!(
            f,
            "\"Heat stress\" is expected for {} hours ({:.1}%).",
            self.hot_hours,
            self.hot_fraction() * 100.0
        )
    }
}

/// Effect of shade on comfort in one hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadeBenefit {
    ComfortableWithoutShade,
    ComfortableWithShade,
    ShadeIsDetrimental,
    ShadeIsBeneficial,
    Undefined,
}

impl ShadeBenefit {
    pub fn label(self) -> &'static str {
        match self {
            ShadeBenefit::ComfortableWithoutShade => "Comfortable without shade",
            ShadeBenefit::ComfortableWithShade => "Comfortable with shade",
            ShadeBenefit::ShadeIsDetrimental => "Shade is detrimental",
            ShadeBenefit::ShadeIsBeneficial => "Shade is beneficial",
            ShadeBenefit::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for ShadeBenefit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Degrees outside the comfort band, 0 when inside
pub fn distance_from_comfort(value: f64, limits: &ComfortLimits) -> f64 {
    if value < limits.low {
        limits.low - value
    } else if value > limits.high {
        value - limits.high
    } else {
        0.0
    }
}

/// Classify each hour by what shade does to comfort
///
/// # Errors
/// Returns `InvalidInput` if the series differ in length or the limits are invalid.
pub fn categorise_shade_benefit(
    unshaded: &[f64],
    shaded: &[f64],
    limits: &ComfortLimits,
) -> Result<Vec<ShadeBenefit>> {
    limits.validate()?;
    if unshaded.len() != shaded.len() {
        return Err(ComfortError::invalid_input(format!(
            "input sizes do not match ({} != {})",
            unshaded.len(),
            shaded.len()
        )));
    }
    Ok(unshaded
        .iter()
        .zip(shaded)
        .map(|(&open, &covered)| {
            let open_distance = distance_from_comfort(open, limits);
            let covered_distance = distance_from_comfort(covered, limits);
            if limits.contains(open) {
                ShadeBenefit::ComfortableWithoutShade
            } else if limits.contains(covered) {
                ShadeBenefit::ComfortableWithShade
            } else if open_distance < covered_distance {
                ShadeBenefit::ShadeIsDetrimental
            } else if open_distance > covered_distance {
                ShadeBenefit::ShadeIsBeneficial
            } else {
                ShadeBenefit::Undefined
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let values: Vec<f64> = (0..HOURS_PER_YEAR)
            .map(|h| match h % 4 {
                0 => 0.0,
                1 | 2 => 20.0,
                _ => 30.0,
            })
            .collect();
        let summary =
            UtciSummary::describe(&values, &AnalysisPeriod::whole_year(), &ComfortLimits::default()).unwrap();
        assert_eq!(summary.hours, HOURS_PER_YEAR);
        assert_eq!(summary.comfortable_hours, HOURS_PER_YEAR / 2);
        assert_eq!(summary.cold_hours, HOURS_PER_YEAR / 4);
        assert_eq!(summary.hot_hours, HOURS_PER_YEAR / 4);
        assert!((summary.comfortable_fraction() - 0.5).abs() < 1e-12);
        let text = summary.to_string();
        assert!(text.contains("4380 out of a possible 8760 hours (50.0%)"));
    }

    #[test]
    fn test_summary_rejects_bad_input() {
        let limits = ComfortLimits { low: 30.0, high: 10.0 };
        let values = vec![20.0; HOURS_PER_YEAR];
        assert!(UtciSummary::describe(&values, &AnalysisPeriod::whole_year(), &limits).is_err());
        assert!(UtciSummary::describe(&values[..10], &AnalysisPeriod::whole_year(), &ComfortLimits::default()).is_err());
    }

    #[test]
    fn test_shade_benefit_categories() {
        let limits = ComfortLimits::default();
        let unshaded = [20.0, 30.0, 35.0, 0.0, 30.0];
        let shaded = [18.0, 24.0, 30.0, -5.0, 30.0];
        let categories = categorise_shade_benefit(&unshaded, &shaded, &limits).unwrap();
        assert_eq!(
            categories,
            vec![
                ShadeBenefit::ComfortableWithoutShade,
                ShadeBenefit::ComfortableWithShade,
                ShadeBenefit::ShadeIsBeneficial,
                ShadeBenefit::ShadeIsDetrimental,
                ShadeBenefit::Undefined,
            ]
        );
        assert!(categorise_shade_benefit(&unshaded, &shaded[..2], &limits).is_err());
    }
}
