//! Month/hour windows of the reference year

use crate::error::{ComfortError, Result};
use crate::weather::series::{hour_of_day, month_of_hour, HOURS_PER_YEAR};
use serde::{Deserialize, Serialize};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Selection of months and hours of the day
///
/// Both ranges are inclusive. A start after the end wraps: months 11 to 2
/// selects November to February, hours 20 to 5 selects the night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct AnalysisPeriod {
    st_month: u32,
    end_month: u32,
    st_hour: u32,
    end_hour: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
    st_month: u32,
    end_month: u32,
    st_hour: u32,
    end_hour: u32,
}

impl TryFrom<RawPeriod> for AnalysisPeriod {
    type Error = ComfortError;

    fn try_from(raw: RawPeriod) -> Result<Self> {
        AnalysisPeriod::new(raw.st_month, raw.end_month, raw.st_hour, raw.end_hour)
    }
}

impl Default for AnalysisPeriod {
    /// The whole year
    fn default() -> Self {
        Self {
            st_month: 1,
            end_month: 12,
            st_hour: 0,
            end_hour: 23,
        }
    }
}

impl AnalysisPeriod {
    /// Create a period
    ///
    /// # Errors
    /// Returns `InvalidInput` if a month is outside 1-12 or an hour outside 0-23.
    pub fn new(st_month: u32, end_month: u32, st_hour: u32, end_hour: u32) -> Result<Self> {
        for month in [st_month, end_month] {
            validate_month(month)?;
        }
        for hour in [st_hour, end_hour] {
            validate_hour(hour)?;
        }
        Ok(Self {
            st_month,
            end_month,
            st_hour,
            end_hour,
        })
    }

    /// The whole year
    pub fn whole_year() -> Self {
        Self::default()
    }

    fn includes_month(&self, month: u32) -> bool {
        if self.st_month <= self.end_month {
            (self.st_month..=self.end_month).contains(&month)
        } else {
            month >= self.st_month || month <= self.end_month
        }
    }

    fn includes_hour(&self, hour: u32) -> bool {
        if self.st_hour <= self.end_hour {
            (self.st_hour..=self.end_hour).contains(&hour)
        } else {
            hour >= self.st_hour || hour <= self.end_hour
        }
    }

    /// True if hour-of-year `hour` falls in the period
    pub fn contains(&self, hour: usize) -> bool {
        hour < HOURS_PER_YEAR
            && self.includes_month(month_of_hour(hour))
            && self.includes_hour(hour_of_day(hour))
    }

    /// Selected hour-of-year indices, ascending
    pub fn hours_of_year(&self) -> Vec<usize> {
        (0..HOURS_PER_YEAR).filter(|&h| self.contains(h)).collect()
    }

    /// Short path-safe label, e.g. `Jun-Aug_09-17`
    pub fn describe(&self) -> String {
        format!(
            "{}-{}_{:02}-{:02}",
            MONTH_ABBREVIATIONS[(self.st_month - 1) as usize],
            MONTH_ABBREVIATIONS[(self.end_month - 1) as usize],
            self.st_hour,
            self.end_hour
        )
    }
}

/// Check a month number
///
/// # Errors
/// Returns `InvalidInput` unless `month` is within 1-12.
pub fn validate_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ComfortError::invalid_input(format!(
            "month must be between 1 and 12 inclusive, got {month}"
        )))
    }
}

/// Check an hour of the day
///
/// # Errors
/// Returns `InvalidInput` unless `hour` is within 0-23.
pub fn validate_hour(hour: u32) -> Result<()> {
    if hour <= 23 {
        Ok(())
    } else {
        Err(ComfortError::invalid_input(format!(
            "hour must be between 0 and 23 inclusive, got {hour}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_year() {
        let period = AnalysisPeriod::whole_year();
        assert_eq!(period.hours_of_year().len(), HOURS_PER_YEAR);
        assert_eq!(period.describe(), "Jan-Dec_00-23");
    }

    #[test]
    fn test_daytime_summer() {
        let period = AnalysisPeriod::new(6, 8, 9, 17).unwrap();
        let hours = period.hours_of_year();
        assert_eq!(hours.len(), (30 + 31 + 31) * 9);
        assert!(hours.iter().all(|&h| (9..=17).contains(&hour_of_day(h))));
        assert_eq!(period.describe(), "Jun-Aug_09-17");
    }

    #[test]
    fn test_wrapping_ranges() {
        let winter_nights = AnalysisPeriod::new(12, 2, 22, 3).unwrap();
        let hours = winter_nights.hours_of_year();
        assert_eq!(hours.len(), (31 + 31 + 28) * 6);
        assert!(winter_nights.contains(0));
        assert!(!winter_nights.contains(12));
        assert!(winter_nights.contains(8759));
    }

    #[test]
    fn test_validation() {
        assert!(AnalysisPeriod::new(0, 12, 0, 23).is_err());
        assert!(AnalysisPeriod::new(1, 13, 0, 23).is_err());
        assert!(AnalysisPeriod::new(1, 12, 0, 24).is_err());
        let bad = r#"{"st_month":1,"end_month":14,"st_hour":0,"end_hour":23}"#;
        assert!(serde_json::from_str::<AnalysisPeriod>(bad).is_err());
    }
}
