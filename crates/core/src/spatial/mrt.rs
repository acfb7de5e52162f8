//! Mean radiant temperature interpolation between shaded and unshaded bounds
//!
//! By day a point's position within its own irradiance range decides how far
//! it sits between the shaded and unshaded MRT. At night there is no solar
//! signal, so the sky-view factor stands in.

use crate::cache::CachedTable;
use crate::config::SmootherConfig;
use crate::error::{ComfortError, Result};
use crate::physics::decay_rate_smoother;
use crate::weather::HOURS_PER_YEAR;
use rayon::prelude::*;

/// Irradiance extremes of one point over the sun-up hours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradianceRange {
    pub min: f64,
    pub max: f64,
}

impl IrradianceRange {
    /// Position of `value` in the range, 0-1
    ///
    /// `None` when the range has no width.
    #[inline]
    pub fn fraction(&self, value: f64) -> Option<f64> {
        let width = self.max - self.min;
        if width > 0.0 && width.is_finite() {
            Some(((value - self.min) / width).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

/// Per-point irradiance range over the hours where `sun_up` is set
///
/// Points with no sun-up hours get `None`.
pub fn irradiance_ranges(irradiance: &CachedTable, sun_up: &[bool]) -> Vec<Option<IrradianceRange>> {
    (0..irradiance.cols)
        .into_par_iter()
        .map(|p| {
            let mut range: Option<IrradianceRange> = None;
            for (h, _) in sun_up.iter().enumerate().filter(|(_, up)| **up) {
                let v = f64::from(irradiance.get(h, p));
                range = Some(match range {
                    None => IrradianceRange { min: v, max: v },
                    Some(r) => IrradianceRange {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                });
            }
            range
        })
        .collect()
}

/// Inputs of the MRT interpolation
pub struct MrtInputs<'a> {
    /// Hourly MRT of a fully shaded point
    pub shaded: &'a [f64],
    /// Hourly MRT of a fully exposed point
    pub unshaded: &'a [f64],
    /// Hours with the sun above the horizon
    pub sun_up: &'a [bool],
    /// Hour-major (8760 × N) total irradiance
    pub irradiance: &'a CachedTable,
    /// Sky-view percentage per point
    pub sky_view: &'a [f64],
}

/// Interpolated and smoothed MRT, hour-major (8760 × N)
///
/// # Errors
/// Returns `InvalidInput` if the series or tables disagree in length.
pub fn interpolate_mrt(inputs: &MrtInputs<'_>, smoother: &SmootherConfig) -> Result<Vec<f64>> {
    let n = inputs.sky_view.len();
    if inputs.shaded.len() != HOURS_PER_YEAR
        || inputs.unshaded.len() != HOURS_PER_YEAR
        || inputs.sun_up.len() != HOURS_PER_YEAR
    {
        return Err(ComfortError::invalid_input(
            "shaded/unshaded MRT and sun-up series must cover 8760 hours",
        ));
    }
    if inputs.irradiance.rows != HOURS_PER_YEAR || inputs.irradiance.cols != n {
        return Err(ComfortError::invalid_input(format!(
            "irradiance is {} x {}, expected {HOURS_PER_YEAR} x {n}",
            inputs.irradiance.rows, inputs.irradiance.cols
        )));
    }

    let ranges = irradiance_ranges(inputs.irradiance, inputs.sun_up);

    let columns: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|p| {
            let night_fraction = (inputs.sky_view[p] / 100.0).clamp(0.0, 1.0);
            let raw: Vec<f64> = (0..HOURS_PER_YEAR)
                .map(|h| {
                    let fraction = if inputs.sun_up[h] {
                        ranges[p]
                            .and_then(|r| r.fraction(f64::from(inputs.irradiance.get(h, p))))
                            .unwrap_or(night_fraction)
                    } else {
                        night_fraction
                    };
                    inputs.shaded[h] + fraction * (inputs.unshaded[h] - inputs.shaded[h])
                })
                .collect();
            decay_rate_smoother(
                &raw,
                smoother.difference_threshold,
                smoother.transition_window,
                smoother.ewm_span,
            )
        })
        .collect();

    let mut matrix = vec![0.0; HOURS_PER_YEAR * n];
    for (p, column) in columns.iter().enumerate() {
        for (h, &v) in column.iter().enumerate() {
            matrix[h * n + p] = v;
        }
    }
    Ok(matrix)
}
