//! Single-point comfort typologies
//!
//! A typology describes a place by what surrounds it: shelters occluding
//! patches of sky, evaporative cooling and a wind speed scale. Evaluated
//! against the boundary conditions it yields hourly DBT, RH, wind speed, MRT
//! and UTCI without any sensor grid.
//!
//! The preset catalog lives in `data/typologies.json` and is compiled in.

pub mod catalog;
pub mod result;
pub mod shelter;
pub mod summary;

pub use catalog::{Typology, TypologyCatalog};
pub use result::{evaluate_typologies, TypologyResult};
pub use shelter::{check_overlaps, Shelter};
pub use summary::{categorise_shade_benefit, distance_from_comfort, ShadeBenefit, UtciSummary};
