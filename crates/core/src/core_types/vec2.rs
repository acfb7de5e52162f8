//! Planar vector/point aliases and compass helpers for sensor grids.

use crate::core_types::units::Degrees;
use nalgebra::{Point2 as NaPoint2, Vector2};

/// 2D vector type for offsets between sensor points and moisture emitters.
///
/// This is a simple alias for `nalgebra::Vector2<f64>`; +X is east and +Y is north.
pub type Vec2 = Vector2<f64>;

/// 2D position of a sensor point or emitter in model coordinates.
pub type Point2 = NaPoint2<f64>;

/// Clockwise angle between `vector` and north (+Y), in [0, 360).
///
/// A zero-length vector returns 0°.
#[inline]
pub fn bearing_from_north(vector: &Vec2) -> Degrees {
    // atan2(x, y) measures clockwise from +Y
    Degrees::new(vector.x.atan2(vector.y).to_degrees()).normalized()
}

/// Signed smallest angular difference `a - b`, in (-180, 180].
#[inline]
pub fn angular_difference(a: Degrees, b: Degrees) -> f64 {
    let diff = (a.value() - b.value()).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}
