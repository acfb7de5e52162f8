//! Universal Thermal Climate Index (UTCI)
//!
//! Operational approximation of the UTCI equivalent temperature as a sixth
//! order polynomial in air temperature, wind speed, radiant-air temperature
//! difference and water vapour pressure.
//!
//! # Scientific References
//! - Bröde, P., Fiala, D., Błażejczyk, K., et al. (2012). "Deriving the
//!   operational procedure for the Universal Thermal Climate Index (UTCI)."
//!   International Journal of Biometeorology 56(3), 481-494.
//! - Jendritzky, G., de Dear, R. & Havenith, G. (2012). "UTCI - Why another
//!   thermal index?" International Journal of Biometeorology 56(3), 421-428.
//!
//! # Inputs
//! - `ta`: air temperature (°C)
//! - `tr`: mean radiant temperature (°C)
//! - `vel`: wind speed 10 m above ground (m/s), clamped to 0-17 m/s
//! - `rh`: relative humidity (%)

use crate::core_types::units::{Celsius, MetersPerSecond, Percent};
use crate::error::{ComfortError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wind-speed range over which the polynomial was fitted (m/s)
pub const UTCI_WIND_SPEED_RANGE: (f64, f64) = (0.0, 17.0);

/// Coefficients of the saturation vapour pressure polynomial, powers -2..=4 of T(K)
const VAPOUR_PRESSURE_COEFFICIENTS: [f64; 7] = [
    -2836.5744,
    -6028.076559,
    19.54263612,
    -0.02737830188,
    0.000016261698,
    7.0229056e-10,
    -1.8680009e-13,
];

/// Polynomial terms as (coefficient, `[power of ta, vel, d_tr, pa]`)
#[rustfmt::skip]
const UTCI_TERMS: [(f64, [usize; 4]); 210] = [
    (0.607562052, [0, 0, 0, 0]),
    (-0.0227712343, [1, 0, 0, 0]),
    (0.000806470249, [2, 0, 0, 0]),
    (-0.000154271372, [3, 0, 0, 0]),
    (-3.24651735e-6, [4, 0, 0, 0]),
    (7.32602852e-8, [5, 0, 0, 0]),
    (1.35959073e-9, [6, 0, 0, 0]),
    (-2.2583652, [0, 1, 0, 0]),
    (0.0880326035, [1, 1, 0, 0]),
    (0.00216844454, [2, 1, 0, 0]),
    (-1.53347087e-5, [3, 1, 0, 0]),
    (-5.72983704e-7, [4, 1, 0, 0]),
    (-2.55090145e-9, [5, 1, 0, 0]),
    (-0.751269505, [0, 2, 0, 0]),
    (-0.00408350271, [1, 2, 0, 0]),
    (-5.21670675e-5, [2, 2, 0, 0]),
    (1.94544667e-6, [3, 2, 0, 0]),
    (1.14099531e-8, [4, 2, 0, 0]),
    (0.158137256, [0, 3, 0, 0]),
    (-6.57263143e-5, [1, 3, 0, 0]),
    (2.22697524e-7, [2, 3, 0, 0]),
    (-4.16117031e-8, [3, 3, 0, 0]),
    (-0.0127762753, [0, 4, 0, 0]),
    (9.66891875e-6, [1, 4, 0, 0]),
    (2.52785852e-9, [2, 4, 0, 0]),
    (0.000456306672, [0, 5, 0, 0]),
    (-1.74202546e-7, [1, 5, 0, 0]),
    (-5.91491269e-6, [0, 6, 0, 0]),
    (0.398374029, [0, 0, 1, 0]),
    (0.000183945314, [1, 0, 1, 0]),
    (-0.00017375451, [2, 0, 1, 0]),
    (-7.60781159e-7, [3, 0, 1, 0]),
    (3.77830287e-8, [4, 0, 1, 0]),
    (5.43079673e-10, [5, 0, 1, 0]),
    (-0.0200518269, [0, 1, 1, 0]),
    (0.000892859837, [1, 1, 1, 0]),
    (3.45433048e-6, [2, 1, 1, 0]),
    (-3.77925774e-7, [3, 1, 1, 0]),
    (-1.69699377e-9, [4, 1, 1, 0]),
    (0.000169992415, [0, 2, 1, 0]),
    (-4.99204314e-5, [1, 2, 1, 0]),
    (2.47417178e-7, [2, 2, 1, 0]),
    (1.07596466e-8, [3, 2, 1, 0]),
    (8.49242932e-5, [0, 3, 1, 0]),
    (1.35191328e-6, [1, 3, 1, 0]),
    (-6.21531254e-9, [2, 3, 1, 0]),
    (-4.99410301e-6, [0, 4, 1, 0]),
    (-1.89489258e-8, [1, 4, 1, 0]),
    (8.15300114e-8, [0, 5, 1, 0]),
    (0.00075504309, [0, 0, 2, 0]),
    (-5.65095215e-5, [1, 0, 2, 0]),
    (-4.52166564e-7, [2, 0, 2, 0]),
    (2.46688878e-8, [3, 0, 2, 0]),
    (2.42674348e-10, [4, 0, 2, 0]),
    (0.00015454725, [0, 1, 2, 0]),
    (5.2411097e-6, [1, 1, 2, 0]),
    (-8.75874982e-8, [2, 1, 2, 0]),
    (-1.50743064e-9, [3, 1, 2, 0]),
    (-1.56236307e-5, [0, 2, 2, 0]),
    (-1.33895614e-7, [1, 2, 2, 0]),
    (2.49709824e-9, [2, 2, 2, 0]),
    (6.51711721e-7, [0, 3, 2, 0]),
    (1.94960053e-9, [1, 3, 2, 0]),
    (-1.00361113e-8, [0, 4, 2, 0]),
    (-1.21206673e-5, [0, 0, 3, 0]),
    (-2.1820366e-7, [1, 0, 3, 0]),
    (7.51269482e-9, [2, 0, 3, 0]),
    (9.79063848e-11, [3, 0, 3, 0]),
    (1.25006734e-6, [0, 1, 3, 0]),
    (-1.81584736e-9, [1, 1, 3, 0]),
    (-3.52197671e-10, [2, 1, 3, 0]),
    (-3.3651463e-8, [0, 2, 3, 0]),
    (1.35908359e-10, [1, 2, 3, 0]),
    (4.1703262e-10, [0, 3, 3, 0]),
    (-1.30369025e-9, [0, 0, 4, 0]),
    (4.13908461e-10, [1, 0, 4, 0]),
    (9.22652254e-12, [2, 0, 4, 0]),
    (-5.08220384e-9, [0, 1, 4, 0]),
    (-2.24730961e-11, [1, 1, 4, 0]),
    (1.17139133e-10, [0, 2, 4, 0]),
    (6.62154879e-10, [0, 0, 5, 0]),
    (4.0386326e-13, [1, 0, 5, 0]),
    (1.95087203e-12, [0, 1, 5, 0]),
    (-4.73602469e-12, [0, 0, 6, 0]),
    (5.12733497, [0, 0, 0, 1]),
    (-0.312788561, [1, 0, 0, 1]),
    (-0.0196701861, [2, 0, 0, 1]),
    (0.00099969087, [3, 0, 0, 1]),
    (9.51738512e-6, [4, 0, 0, 1]),
    (-4.66426341e-7, [5, 0, 0, 1]),
    (0.548050612, [0, 1, 0, 1]),
    (-0.00330552823, [1, 1, 0, 1]),
    (-0.0016411944, [2, 1, 0, 1]),
    (-5.16670694e-6, [3, 1, 0, 1]),
    (9.52692432e-7, [4, 1, 0, 1]),
    (-0.0429223622, [0, 2, 0, 1]),
    (0.00500845667, [1, 2, 0, 1]),
    (1.00601257e-6, [2, 2, 0, 1]),
    (-1.81748644e-6, [3, 2, 0, 1]),
    (-0.00125813502, [0, 3, 0, 1]),
    (-0.000179330391, [1, 3, 0, 1]),
    (2.34994441e-6, [2, 3, 0, 1]),
    (0.000129735808, [0, 4, 0, 1]),
    (1.2906487e-6, [1, 4, 0, 1]),
    (-2.28558686e-6, [0, 5, 0, 1]),
    (-0.0369476348, [0, 0, 1, 1]),
    (0.00162325322, [1, 0, 1, 1]),
    (-3.1427968e-5, [2, 0, 1, 1]),
    (2.59835559e-6, [3, 0, 1, 1]),
    (-4.77136523e-8, [4, 0, 1, 1]),
    (0.0086420339, [0, 1, 1, 1]),
    (-0.000687405181, [1, 1, 1, 1]),
    (-9.13863872e-6, [2, 1, 1, 1]),
    (5.15916806e-7, [3, 1, 1, 1]),
    (-3.59217476e-5, [0, 2, 1, 1]),
    (3.28696511e-5, [1, 2, 1, 1]),
    (-7.10542454e-7, [2, 2, 1, 1]),
    (-1.243823e-5, [0, 3, 1, 1]),
    (-7.385844e-9, [1, 3, 1, 1]),
    (2.20609296e-7, [0, 4, 1, 1]),
    (-0.00073246918, [0, 0, 2, 1]),
    (-1.87381964e-5, [1, 0, 2, 1]),
    (4.80925239e-6, [2, 0, 2, 1]),
    (-8.7549204e-8, [3, 0, 2, 1]),
    (2.7786293e-5, [0, 1, 2, 1]),
    (-5.06004592e-6, [1, 1, 2, 1]),
    (1.14325367e-7, [2, 1, 2, 1]),
    (2.53016723e-6, [0, 2, 2, 1]),
    (-1.72857035e-8, [1, 2, 2, 1]),
    (-3.95079398e-8, [0, 3, 2, 1]),
    (-3.59413173e-7, [0, 0, 3, 1]),
    (7.04388046e-7, [1, 0, 3, 1]),
    (-1.89309167e-8, [2, 0, 3, 1]),
    (-4.79768731e-7, [0, 1, 3, 1]),
    (7.96079978e-9, [1, 1, 3, 1]),
    (1.62897058e-9, [0, 2, 3, 1]),
    (3.94367674e-8, [0, 0, 4, 1]),
    (-1.18566247e-9, [1, 0, 4, 1]),
    (3.34678041e-10, [0, 1, 4, 1]),
    (-1.15606447e-10, [0, 0, 5, 1]),
    (-2.80626406, [0, 0, 0, 2]),
    (0.548712484, [1, 0, 0, 2]),
    (-0.0039942841, [2, 0, 0, 2]),
    (-0.000954009191, [3, 0, 0, 2]),
    (1.93090978e-5, [4, 0, 0, 2]),
    (-0.308806365, [0, 1, 0, 2]),
    (0.0116952364, [1, 1, 0, 2]),
    (0.000495271903, [2, 1, 0, 2]),
    (-1.90710882e-5, [3, 1, 0, 2]),
    (0.00210787756, [0, 2, 0, 2]),
    (-0.000698445738, [1, 2, 0, 2]),
    (2.30109073e-5, [2, 2, 0, 2]),
    (0.00041785659, [0, 3, 0, 2]),
    (-1.27043871e-5, [1, 3, 0, 2]),
    (-3.04620472e-6, [0, 4, 0, 2]),
    (0.0514507424, [0, 0, 1, 2]),
    (-0.00432510997, [1, 0, 1, 2]),
    (8.99281156e-5, [2, 0, 1, 2]),
    (-7.14663943e-7, [3, 0, 1, 2]),
    (-0.000266016305, [0, 1, 1, 2]),
    (0.000263789586, [1, 1, 1, 2]),
    (-7.01199003e-6, [2, 1, 1, 2]),
    (-0.000106823306, [0, 2, 1, 2]),
    (3.61341136e-6, [1, 2, 1, 2]),
    (2.29748967e-7, [0, 3, 1, 2]),
    (0.000304788893, [0, 0, 2, 2]),
    (-6.42070836e-5, [1, 0, 2, 2]),
    (1.16257971e-6, [2, 0, 2, 2]),
    (7.68023384e-6, [0, 1, 2, 2]),
    (-5.47446896e-7, [1, 1, 2, 2]),
    (-3.5993791e-8, [0, 2, 2, 2]),
    (-4.36497725e-6, [0, 0, 3, 2]),
    (1.68737969e-7, [1, 0, 3, 2]),
    (2.67489271e-8, [0, 1, 3, 2]),
    (3.23926897e-9, [0, 0, 4, 2]),
    (-0.0353874123, [0, 0, 0, 3]),
    (-0.22120119, [1, 0, 0, 3]),
    (0.0155126038, [2, 0, 0, 3]),
    (-0.000263917279, [3, 0, 0, 3]),
    (0.0453433455, [0, 1, 0, 3]),
    (-0.00432943862, [1, 1, 0, 3]),
    (0.000145389826, [2, 1, 0, 3]),
    (0.00021750861, [0, 2, 0, 3]),
    (-6.66724702e-5, [1, 2, 0, 3]),
    (3.3321714e-5, [0, 3, 0, 3]),
    (-0.00226921615, [0, 0, 1, 3]),
    (0.000380261982, [1, 0, 1, 3]),
    (-5.45314314e-9, [2, 0, 1, 3]),
    (-0.000796355448, [0, 1, 1, 3]),
    (2.53458034e-5, [1, 1, 1, 3]),
    (-6.31223658e-6, [0, 2, 1, 3]),
    (0.000302122035, [0, 0, 2, 3]),
    (-4.77403547e-6, [1, 0, 2, 3]),
    (1.73825715e-6, [0, 1, 2, 3]),
    (-4.09087898e-7, [0, 0, 3, 3]),
    (0.614155345, [0, 0, 0, 4]),
    (-0.0616755931, [1, 0, 0, 4]),
    (0.00133374846, [2, 0, 0, 4]),
    (0.00355375387, [0, 1, 0, 4]),
    (-0.000513027851, [1, 1, 0, 4]),
    (0.000102449757, [0, 2, 0, 4]),
    (-0.00148526421, [0, 0, 1, 4]),
    (-4.11469183e-5, [1, 0, 1, 4]),
    (-6.80434415e-6, [0, 1, 1, 4]),
    (-9.77675906e-6, [0, 0, 2, 4]),
    (0.0882773108, [0, 0, 0, 5]),
    (-0.00301859306, [1, 0, 0, 5]),
    (0.00104452989, [0, 1, 0, 5]),
    (0.000247090539, [0, 0, 1, 5]),
    (0.00148348065, [0, 0, 0, 6]),
];

const MAX_POWER: usize = 6;

/// Saturation vapour pressure in hectopascals from the UTCI reference polynomial
fn saturation_vapour_pressure_hpa(ta: f64) -> f64 {
    let tk = ta + Celsius::KELVIN_OFFSET;
    let mut es = 2.7150305 * tk.ln();
    for (i, coefficient) in VAPOUR_PRESSURE_COEFFICIENTS.iter().enumerate() {
        es += coefficient * tk.powi(i as i32 - 2);
    }
    es.exp() * 0.01
}

fn powers(x: f64) -> [f64; MAX_POWER + 1] {
    let mut out = [1.0; MAX_POWER + 1];
    for i in 1..=MAX_POWER {
        out[i] = out[i - 1] * x;
    }
    out
}

/// Evaluate the polynomial on raw floats, without clamping the wind speed
pub(crate) fn utci_polynomial(ta: f64, tr: f64, vel: f64, rh: f64) -> f64 {
    // vapour pressure in kPa
    let pa = saturation_vapour_pressure_hpa(ta) * (rh / 100.0) / 10.0;
    let d_tr = tr - ta;

    let p_ta = powers(ta);
    let p_vel = powers(vel);
    let p_dtr = powers(d_tr);
    let p_pa = powers(pa);

    let offset: f64 = UTCI_TERMS
        .iter()
        .map(|&(c, [i, j, k, l])| c * p_ta[i] * p_vel[j] * p_dtr[k] * p_pa[l])
        .sum();
    ta + offset
}

/// UTCI equivalent temperature for a single set of conditions
///
/// Wind speed is clamped into [`UTCI_WIND_SPEED_RANGE`] before evaluation.
///
/// # Example
/// ```
/// use comfort_sim_core::core_types::units::{Celsius, MetersPerSecond, Percent};
/// use comfort_sim_core::physics::utci::utci;
///
/// let value = utci(
///     Celsius::new(20.0),
///     Celsius::new(20.0),
///     MetersPerSecond::new(1.0),
///     Percent::new(50.0),
/// );
/// assert!((*value - 19.4).abs() < 0.1);
/// ```
pub fn utci(ta: Celsius, tr: Celsius, vel: MetersPerSecond, rh: Percent) -> Celsius {
    let (lo, hi) = UTCI_WIND_SPEED_RANGE;
    Celsius::from(utci_polynomial(*ta, *tr, vel.value().clamp(lo, hi), *rh))
}

/// UTCI over aligned arrays
///
/// Each input is a flat slice of equal length; element `i` of the output is
/// computed from element `i` of every input. Wind speeds are clamped into
/// `wind_speed_range`.
///
/// # Errors
/// Returns `InvalidInput` if the slices differ in length.
pub fn utci_array(
    ta: &[f64],
    tr: &[f64],
    vel: &[f64],
    rh: &[f64],
    wind_speed_range: (f64, f64),
) -> Result<Vec<f64>> {
    let n = ta.len();
    if tr.len() != n || vel.len() != n || rh.len() != n {
        return Err(ComfortError::invalid_input(format!(
            "UTCI inputs must be the same length (ta {}, tr {}, vel {}, rh {})",
            n,
            tr.len(),
            vel.len(),
            rh.len()
        )));
    }
    let (lo, hi) = wind_speed_range;
    Ok((0..n)
        .map(|i| utci_polynomial(ta[i], tr[i], vel[i].clamp(lo, hi), rh[i]))
        .collect())
}

/// Thermal stress classes of the UTCI assessment scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UtciCategory {
    /// Below -40°C
    ExtremeColdStress,
    /// -40 to -27°C
    VeryStrongColdStress,
    /// -27 to -13°C
    StrongColdStress,
    /// -13 to 0°C
    ModerateColdStress,
    /// 0 to 9°C
    SlightColdStress,
    /// 9 to 26°C
    NoThermalStress,
    /// 26 to 32°C
    ModerateHeatStress,
    /// 32 to 38°C
    StrongHeatStress,
    /// 38 to 46°C
    VeryStrongHeatStress,
    /// Above 46°C
    ExtremeHeatStress,
}

impl UtciCategory {
    /// All classes from coldest to hottest
    pub const ALL: [UtciCategory; 10] = [
        UtciCategory::ExtremeColdStress,
        UtciCategory::VeryStrongColdStress,
        UtciCategory::StrongColdStress,
        UtciCategory::ModerateColdStress,
        UtciCategory::SlightColdStress,
        UtciCategory::NoThermalStress,
        UtciCategory::ModerateHeatStress,
        UtciCategory::StrongHeatStress,
        UtciCategory::VeryStrongHeatStress,
        UtciCategory::ExtremeHeatStress,
    ];

    /// Upper bounds of every class except the last (°C, exclusive)
    const UPPER_BOUNDS: [f64; 9] = [-40.0, -27.0, -13.0, 0.0, 9.0, 26.0, 32.0, 38.0, 46.0];

    /// Classify a UTCI value
    pub fn from_utci(value: f64) -> Self {
        let index = Self::UPPER_BOUNDS
            .iter()
            .position(|&bound| value < bound)
            .unwrap_or(Self::UPPER_BOUNDS.len());
        Self::ALL[index]
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            UtciCategory::ExtremeColdStress => "Extreme cold stress",
            UtciCategory::VeryStrongColdStress => "Very strong cold stress",
            UtciCategory::StrongColdStress => "Strong cold stress",
            UtciCategory::ModerateColdStress => "Moderate cold stress",
            UtciCategory::SlightColdStress => "Slight cold stress",
            UtciCategory::NoThermalStress => "No thermal stress",
            UtciCategory::ModerateHeatStress => "Moderate heat stress",
            UtciCategory::StrongHeatStress => "Strong heat stress",
            UtciCategory::VeryStrongHeatStress => "Very strong heat stress",
            UtciCategory::ExtremeHeatStress => "Extreme heat stress",
        }
    }
}

impl fmt::Display for UtciCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
