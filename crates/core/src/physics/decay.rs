//! Distance decay and transition smoothing
//!
//! Two small numeric primitives shared by the moisture plume and the MRT
//! interpolation:
//!
//! - [`proximity_decay`] attenuates a magnitude with distance from its source,
//!   reaching zero at a maximum influence radius.
//! - [`decay_rate_smoother`] damps sharp hour-over-hour drops in a series
//!   (e.g. a point passing from sun into shade) with a short exponentially
//!   weighted mean.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Shape of the radial decay profile
///
/// With `d` the distance normalised by the influence radius (clamped to 0-1):
/// - `Linear`: `1 - d`
/// - `Parabolic`: `1 - d²`
/// - `Sigmoid`: `1 - (sin(πd - π/2) + 1) / 2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayCurve {
    Linear,
    #[default]
    Parabolic,
    Sigmoid,
}

impl DecayCurve {
    /// Attenuation factor (0-1) at normalised distance `d` in [0, 1]
    #[inline]
    pub fn factor(self, d: f64) -> f64 {
        match self {
            DecayCurve::Linear => 1.0 - d,
            DecayCurve::Parabolic => 1.0 - d * d,
            DecayCurve::Sigmoid => 1.0 - 0.5 * ((d * PI - PI / 2.0).sin() + 1.0),
        }
    }
}

/// Magnitude remaining at `distance` from a source of strength `value`
///
/// Distances beyond `max_distance` return 0. A non-positive or non-finite
/// `max_distance` gives no contribution at all.
#[inline]
pub fn proximity_decay(value: f64, distance: f64, max_distance: f64, curve: DecayCurve) -> f64 {
    if !(max_distance.is_finite() && max_distance > 0.0) || distance.is_nan() {
        return 0.0;
    }
    let d = (distance / max_distance).clamp(0.0, 1.0);
    curve.factor(d) * value
}

/// Smooth sharp drops in a series with an exponentially weighted mean
///
/// An index is a transition when the value falls by more than
/// `difference_threshold` from the previous one. The transition index and the
/// following `transition_window - 1` indices take the adjusted exponentially
/// weighted mean (α = 2 / (span + 1)); all other indices pass through. The
/// window counter starts at the beginning of the series, so the first
/// `transition_window` values are always smoothed (the mean of a single value
/// is the value itself, so index 0 is unchanged).
///
/// # Arguments
/// * `series` - Values to smooth
/// * `difference_threshold` - Size of drop (positive) that counts as a transition
/// * `transition_window` - Number of values smoothed from each transition
/// * `ewm_span` - Span of the exponentially weighted mean (>= 1)
pub fn decay_rate_smoother(
    series: &[f64],
    difference_threshold: f64,
    transition_window: usize,
    ewm_span: f64,
) -> Vec<f64> {
    let decay = 1.0 - 2.0 / (ewm_span + 1.0);

    let mut out = Vec::with_capacity(series.len());
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut since_transition = 0usize;

    for (i, &value) in series.iter().enumerate() {
        numerator = value + decay * numerator;
        denominator = 1.0 + decay * denominator;

        if i > 0 && value - series[i - 1] < -difference_threshold {
            since_transition = 0;
        }
        if since_transition < transition_window {
            out.push(numerator / denominator);
        } else {
            out.push(value);
        }
        since_transition = since_transition.saturating_add(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parabolic_decay_end_points() {
        assert_relative_eq!(proximity_decay(0.5, 0.0, 5.0, DecayCurve::Parabolic), 0.5);
        assert_relative_eq!(proximity_decay(0.5, 5.0, 5.0, DecayCurve::Parabolic), 0.0);
        assert_relative_eq!(proximity_decay(0.5, 10.0, 5.0, DecayCurve::Parabolic), 0.0);
        assert_relative_eq!(proximity_decay(1.0, 2.5, 5.0, DecayCurve::Parabolic), 0.75);
    }

    #[test]
    fn test_curve_shapes_at_midpoint() {
        assert_relative_eq!(proximity_decay(1.0, 1.0, 2.0, DecayCurve::Linear), 0.5);
        assert_relative_eq!(
            proximity_decay(1.0, 1.0, 2.0, DecayCurve::Sigmoid),
            0.5,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            proximity_decay(1.0, 0.0, 2.0, DecayCurve::Sigmoid),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_decay_monotonic_in_distance() {
        for curve in [DecayCurve::Linear, DecayCurve::Parabolic, DecayCurve::Sigmoid] {
            let mut previous = f64::INFINITY;
            for step in 0_i32..=40 {
                let v = proximity_decay(0.7, f64::from(step) * 0.25, 8.0, curve);
                assert!(v <= previous + 1e-12, "{curve:?} increased at step {step}");
                previous = v;
            }
        }
    }

    #[test]
    fn test_degenerate_radius_contributes_nothing() {
        assert_eq!(proximity_decay(0.5, 0.0, 0.0, DecayCurve::Parabolic), 0.0);
        assert_eq!(proximity_decay(0.5, 1.0, f64::NAN, DecayCurve::Linear), 0.0);
    }

    #[test]
    fn test_smoother_passes_steady_series() {
        let series = vec![20.0; 24];
        let smoothed = decay_rate_smoother(&series, 10.0, 4, 1.25);
        for v in smoothed {
            assert_relative_eq!(v, 20.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_smoother_damps_drop() {
        // 10 hours at 40 then a sudden drop to 20
        let mut series = vec![40.0; 10];
        series.extend(vec![20.0; 10]);
        let smoothed = decay_rate_smoother(&series, 10.0, 4, 1.25);

        // Hours 4..10 untouched, hour 10 smoothed above the raw 20
        assert_eq!(smoothed[5], 40.0);
        assert!(smoothed[10] > 20.0 && smoothed[10] < 40.0);
        assert!(smoothed[13] > 20.0);
        assert_eq!(smoothed[14], 20.0);

        // α = 2 / 2.25; adjusted weights over the whole history
        let decay: f64 = 1.0 - 2.0 / 2.25;
        let num: f64 = 20.0 + (1..=10).map(|k| 40.0 * decay.powi(k)).sum::<f64>();
        let den: f64 = (0..=10).map(|k| decay.powi(k)).sum::<f64>();
        assert_relative_eq!(smoothed[10], num / den, epsilon = 1e-9);
    }

    #[test]
    fn test_smoother_ignores_rises() {
        let mut series = vec![20.0; 10];
        series.extend(vec![40.0; 10]);
        let smoothed = decay_rate_smoother(&series, 10.0, 4, 1.25);
        assert_eq!(smoothed[10], 40.0);
    }
}
