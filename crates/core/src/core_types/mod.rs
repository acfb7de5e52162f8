//! Core types and utilities

pub mod units;
pub mod vec2;

pub use units::*;
pub use vec2::{angular_difference, bearing_from_north, Point2, Vec2};
