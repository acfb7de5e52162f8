//! Moisture field builder
//!
//! Static water features (ponds, misters, fountains) cool the air around them
//! by evaporation. Each source is expanded into a plume per distinct wind
//! state of the year: a radial decay out to a speed-dependent radius, gated
//! to a narrow sector downwind of every emitter. Calm air drops the gate.
//!
//! The per-state field is cached per source, combined across sources by
//! point-wise maximum and finally expanded to one row per hour.
//!
//! # Scientific References
//!
//! - Bröde, P. et al. (2012) "Deriving the operational procedure for the
//!   Universal Thermal Climate Index (UTCI)", Int J Biometeorol 56:481-494
//! - Nishimura, N. et al. (1998) "Novel water facilities for creation of
//!   comfortable urban micrometeorology", Solar Energy 64(4-6):197-207

pub mod field;
pub mod source;

pub use field::{expand_by_state, plume_effectiveness, MoistureFieldBuilder};
pub use source::{load_moisture_sources, MoistureSource, SourceGeometry, MOISTURE_SOURCES_FILE};
