//! Per-point evaporative-cooling effectiveness driven by wind

use crate::cache::{load_or_compute, CachePolicy, CachedTable, Fingerprint, MatrixCache};
use crate::config::PlumeConfig;
use crate::core_types::{angular_difference, bearing_from_north, Point2};
use crate::error::{ComfortError, Result};
use crate::moisture::source::MoistureSource;
use crate::physics::proximity_decay;
use crate::weather::{WindState, WindStates};
use rayon::prelude::*;
use tracing::{debug, info};

/// Effectiveness a single emitter contributes at `point`
///
/// # Arguments
/// * `emitter` - Emitter location
/// * `point` - Sensor location
/// * `magnitude` - Effectiveness at the emitter
/// * `state` - Wind state of the hour
/// * `plume` - Plume geometry
///
/// # Returns
/// Decayed magnitude if the point is inside the plume, otherwise 0
pub fn plume_effectiveness(
    emitter: Point2,
    point: Point2,
    magnitude: f64,
    state: WindState,
    plume: &PlumeConfig,
) -> f64 {
    let offset = point - emitter;
    let distance = offset.norm();

    let radius = if state.speed.is_calm() {
        plume.calm_radius
    } else {
        *state.speed * plume.wind_speed_radius_multiplier
    };

    // Calm air spreads in every direction; the emitter's own location is always wet
    if !state.speed.is_calm() && distance > 0.0 {
        let downwind = state.direction.opposite();
        let off_axis = angular_difference(bearing_from_north(&offset), downwind).abs();
        if off_axis > plume.half_width() {
            return 0.0;
        }
    }

    proximity_decay(magnitude, distance, radius, plume.decay_curve)
}

/// Builds moisture fields over a fixed grid and wind record
pub struct MoistureFieldBuilder<'a> {
    points: &'a [Point2],
    wind_states: &'a WindStates,
    plume: PlumeConfig,
}

impl<'a> MoistureFieldBuilder<'a> {
    pub fn new(points: &'a [Point2], wind_states: &'a WindStates, plume: PlumeConfig) -> Self {
        Self {
            points,
            wind_states,
            plume,
        }
    }

    /// Field of one source, state-major (`wind_states.len()` × N)
    ///
    /// Polygon sources take the maximum over their vertices.
    pub fn source_field(&self, source: &MoistureSource) -> Vec<f64> {
        let n = self.points.len();
        let mut field = vec![0.0; self.wind_states.len() * n];
        if n == 0 {
            return field;
        }
        let emitters = source.emitters();

        field
            .par_chunks_mut(n)
            .zip(self.wind_states.unique.par_iter())
            .for_each(|(row, &state)| {
                for (value, &point) in row.iter_mut().zip(self.points) {
                    *value = emitters
                        .iter()
                        .map(|&e| plume_effectiveness(e, point, source.magnitude, state, &self.plume))
                        .fold(0.0, f64::max);
                }
            });
        field
    }

    /// Fingerprint of one source's field over this grid and wind record
    pub fn source_fingerprint(&self, source: &MoistureSource, points: Fingerprint) -> Fingerprint {
        let builder = source
            .fingerprint(Fingerprint::builder().str("moisture"))
            .fingerprint(points);
        self.wind_states
            .fingerprint(builder)
            .f64(self.plume.calm_radius)
            .f64(self.plume.wind_speed_radius_multiplier)
            .f64(self.plume.angle_width)
            .str(&format!("{:?}", self.plume.decay_curve))
            .finish()
    }

    /// Field of one source, read from or written to `cache` under `moisture_<id>`
    ///
    /// # Errors
    /// Returns `Cache` if the stored table does not span this grid and wind
    /// record; propagates other cache errors.
    pub fn cached_source_field(
        &self,
        source: &MoistureSource,
        points: Fingerprint,
        cache: &dyn MatrixCache,
        policy: CachePolicy,
    ) -> Result<CachedTable> {
        let key = source.cache_key();
        let fingerprint = self.source_fingerprint(source, points);
        let (rows, cols) = (self.wind_states.len(), self.points.len());
        let table = load_or_compute(cache, policy, &key, fingerprint, || {
            info!(source = %source, states = rows, "Computing moisture field");
            let field = self.source_field(source);
            CachedTable::from_f64(fingerprint, rows, cols, &field)
        })?;
        if table.rows != rows || table.cols != cols {
            return Err(ComfortError::cache(
                key,
                format!(
                    "cached moisture field is {} x {}, expected {rows} x {cols}",
                    table.rows, table.cols
                ),
            ));
        }
        Ok(table)
    }

    /// Annual (8760 × N) effectiveness matrix, hour-major
    ///
    /// Sources combine by point-wise maximum. With no sources the matrix is
    /// all zero and no plume is computed.
    ///
    /// # Errors
    /// Propagates cache errors.
    pub fn hourly_matrix(
        &self,
        sources: &[MoistureSource],
        points: Fingerprint,
        cache: &dyn MatrixCache,
        policy: CachePolicy,
    ) -> Result<Vec<f64>> {
        let n = self.points.len();
        let hours = self.wind_states.hourly_index.len();
        if sources.is_empty() {
            debug!("No moisture sources, moisture matrix is zero");
            return Ok(vec![0.0; hours * n]);
        }

        let mut combined = vec![0.0_f64; self.wind_states.len() * n];
        for source in sources {
            let table = self.cached_source_field(source, points, cache, policy)?;
            for (c, &v) in combined.iter_mut().zip(&table.values) {
                *c = c.max(f64::from(v));
            }
        }

        Ok(expand_by_state(&combined, &self.wind_states.hourly_index, n))
    }
}

/// Expand a state-major field to one row per hour
pub fn expand_by_state(field: &[f64], hourly_index: &[usize], n: usize) -> Vec<f64> {
    let mut matrix = Vec::with_capacity(hourly_index.len() * n);
    for &state in hourly_index {
        matrix.extend_from_slice(&field[state * n..(state + 1) * n]);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::core_types::{Degrees, MetersPerSecond};
    use approx::assert_relative_eq;

    fn state(speed: f64, direction: f64) -> WindState {
        WindState {
            speed: MetersPerSecond::new(speed),
            direction: Degrees::new(direction),
        }
    }

    #[test]
    fn test_calm_radial_decay() {
        let plume = PlumeConfig::default();
        let origin = Point2::origin();
        let calm = state(0.0, 0.0);
        assert_relative_eq!(plume_effectiveness(origin, origin, 0.5, calm, &plume), 0.5);
        assert_relative_eq!(plume_effectiveness(origin, Point2::new(5.0, 0.0), 0.5, calm, &plume), 0.0);
        assert_relative_eq!(plume_effectiveness(origin, Point2::new(10.0, 0.0), 0.5, calm, &plume), 0.0);
        // omni-directional
        let west = plume_effectiveness(origin, Point2::new(-2.0, 0.0), 0.5, calm, &plume);
        let north = plume_effectiveness(origin, Point2::new(0.0, 2.0), 0.5, calm, &plume);
        assert!(west > 0.0);
        assert_relative_eq!(west, north);
    }

    #[test]
    fn test_plume_points_downwind() {
        let plume = PlumeConfig::default();
        let origin = Point2::origin();
        // wind from the north carries moisture south
        let northerly = state(1.0, 0.0);
        assert!(plume_effectiveness(origin, Point2::new(0.0, -3.0), 0.5, northerly, &plume) > 0.0);
        assert_eq!(plume_effectiveness(origin, Point2::new(0.0, 3.0), 0.5, northerly, &plume), 0.0);
        assert_eq!(plume_effectiveness(origin, Point2::new(3.0, 0.0), 0.5, northerly, &plume), 0.0);
    }

    #[test]
    fn test_plume_edge_is_inclusive_and_wraps() {
        let plume = PlumeConfig::default();
        let origin = Point2::origin();
        // wind from 180 blows north; emitter-to-point bearing 354 is 6 degrees off axis
        let southerly = state(1.0, 180.0);
        let edge = Point2::new(-(6.0_f64.to_radians().sin()) * 4.0, 6.0_f64.to_radians().cos() * 4.0);
        let beyond = Point2::new(-(7.0_f64.to_radians().sin()) * 4.0, 7.0_f64.to_radians().cos() * 4.0);
        let mut widened = plume;
        widened.angle_width = 12.0 + 1e-9;
        assert!(plume_effectiveness(origin, edge, 0.5, southerly, &widened) > 0.0);
        assert_eq!(plume_effectiveness(origin, beyond, 0.5, southerly, &plume), 0.0);

        // wind from 186 blows toward 6; a point due north sits exactly on the edge
        let skewed = state(1.0, 186.0);
        let north = Point2::new(0.0, 4.0);
        assert_relative_eq!(plume_effectiveness(origin, north, 0.5, skewed, &plume), 0.42, epsilon = 1e-12);
    }

    #[test]
    fn test_effectiveness_non_increasing_with_distance() {
        let plume = PlumeConfig::default();
        let origin = Point2::origin();
        let wind = state(2.0, 270.0);
        let values: Vec<f64> = (0..30)
            .map(|i| plume_effectiveness(origin, Point2::new(f64::from(i), 0.0), 0.8, wind, &plume))
            .collect();
        assert!(values.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_polygon_is_max_over_vertices() {
        let points = [Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(9.0, 0.0)];
        let states = WindStates::from_series(&[0.0], &[0.0]);
        let builder = MoistureFieldBuilder::new(&points, &states, PlumeConfig::default());

        let polygon = MoistureSource::polygon(
            "pool",
            0.4,
            vec![Point2::new(0.0, 1.0), Point2::new(8.0, 1.0), Point2::new(8.0, -1.0)],
        );
        let field = builder.source_field(&polygon);
        for (p, &point) in points.iter().enumerate() {
            let expected = polygon
                .emitters()
                .iter()
                .map(|&e| plume_effectiveness(e, point, 0.4, states.unique[0], &PlumeConfig::default()))
                .fold(0.0, f64::max);
            assert_relative_eq!(field[p], expected);
        }
    }

    #[test]
    fn test_hourly_matrix_combines_by_max_and_expands() {
        let points = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let states = WindStates::from_series(&[0.0, 1.0, 0.0], &[0.0, 0.0, 0.0]);
        let builder = MoistureFieldBuilder::new(&points, &states, PlumeConfig::default());
        let cache = MemoryCache::new();
        let sources = [
            MoistureSource::point("a", 0.5, Point2::new(0.0, 0.0)),
            MoistureSource::point("b", 0.2, Point2::new(2.0, 0.0)),
        ];

        let matrix = builder
            .hourly_matrix(&sources, Fingerprint(7), &cache, CachePolicy::Validate)
            .unwrap();
        assert_eq!(matrix.len(), 3 * 2);
        // hour 0 calm: each point sits on one emitter
        assert_relative_eq!(matrix[0], 0.5, epsilon = 1e-6);
        assert!(matrix[1] >= 0.2 - 1e-6);
        // hours 0 and 2 share a state
        assert_eq!(matrix[0..2], matrix[4..6]);
        assert_eq!(cache.keys(), vec!["moisture_a", "moisture_b"]);
    }

    #[test]
    fn test_trusted_table_of_wrong_shape_is_rejected() {
        let points = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let states = WindStates::from_series(&[0.0, 1.0, 2.0], &[0.0, 90.0, 180.0]);
        let builder = MoistureFieldBuilder::new(&points, &states, PlumeConfig::default());
        let cache = MemoryCache::new();
        let stale = CachedTable::new(Fingerprint(0), 1, 1, vec![0.9]).unwrap();
        cache.store("moisture_a", &stale).unwrap();
        let sources = [MoistureSource::point("a", 0.5, Point2::origin())];

        let err = builder
            .hourly_matrix(&sources, Fingerprint(7), &cache, CachePolicy::Trust)
            .unwrap_err();
        assert!(matches!(err, ComfortError::Cache { ref key, .. } if key == "moisture_a"));

        // validating recomputes over the stale entry
        let matrix = builder
            .hourly_matrix(&sources, Fingerprint(7), &cache, CachePolicy::Validate)
            .unwrap();
        assert_eq!(matrix.len(), 3 * 2);
        assert_relative_eq!(matrix[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_no_sources_is_zero_and_uncached() {
        let points = [Point2::new(0.0, 0.0)];
        let states = WindStates::from_series(&[1.0, 2.0], &[0.0, 90.0]);
        let builder = MoistureFieldBuilder::new(&points, &states, PlumeConfig::default());
        let cache = MemoryCache::new();
        let matrix = builder
            .hourly_matrix(&[], Fingerprint(1), &cache, CachePolicy::Validate)
            .unwrap();
        assert_eq!(matrix, vec![0.0, 0.0]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_fingerprint_tracks_plume() {
        let points = [Point2::new(0.0, 0.0)];
        let states = WindStates::from_series(&[1.0], &[0.0]);
        let source = MoistureSource::point("a", 0.5, Point2::origin());
        let a = MoistureFieldBuilder::new(&points, &states, PlumeConfig::default());
        let mut wider = PlumeConfig::default();
        wider.angle_width = 30.0;
        let b = MoistureFieldBuilder::new(&points, &states, wider);
        assert_ne!(
            a.source_fingerprint(&source, Fingerprint(1)),
            b.source_fingerprint(&source, Fingerprint(1))
        );
    }
}
