//! Outdoor Comfort Simulation Core Library
//!
//! Spatial and single-point outdoor thermal comfort based on the Universal
//! Thermal Climate Index (UTCI). A radiance sensor-grid simulation plus annual
//! hourly boundary conditions are turned into (8760 × N) matrices of mean
//! radiant temperature, dry-bulb temperature, relative humidity, wind speed
//! and UTCI, with evaporative cooling from nearby water features.
//!
//! ## Layout
//!
//! - [`weather`]: hourly boundary conditions and analysis periods
//! - [`grid`]: sensor-grid artifacts (points, irradiance, sky view)
//! - [`cache`]: fingerprinted matrix cache on disk or in memory
//! - [`physics`]: psychrometrics, evaporative cooling, UTCI, smoothing
//! - [`moisture`]: wind-driven moisture plumes from water features
//! - [`spatial`]: the lazily evaluated spatial matrices
//! - [`typology`]: single-point shelters and comfort summaries

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Inputs and storage
pub mod cache;
pub mod grid;
pub mod weather;

// Models
pub mod moisture;
pub mod physics;
pub mod spatial;
pub mod typology;

// Re-export core types
pub use config::{ComfortLimits, PlumeConfig, SmootherConfig, SpatialConfig};
pub use core_types::{Point2, Vec2};
pub use error::{ComfortError, Result};

// Re-export engine types
pub use cache::{CachePolicy, DiskCache, MemoryCache};
pub use moisture::MoistureSource;
pub use spatial::{SpatialComfort, SpatialComfortResult, SpatialMatrix};
pub use typology::{evaluate_typologies, Typology, TypologyCatalog, TypologyResult, UtciSummary};
pub use weather::{AnalysisPeriod, BoundaryConditions, HourlyTimeSeries};
