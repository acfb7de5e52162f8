//! Typologies and the preset catalog

use crate::error::{ComfortError, Result};
use crate::typology::shelter::{check_overlaps, Shelter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Preset catalog shipped with the crate
const DEFAULT_CATALOG: &str = include_str!("../../data/typologies.json");

fn default_wind_speed_multiplier() -> f64 {
    1.0
}

/// A named combination of shelters, evaporative cooling and wind adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typology {
    pub name: String,
    #[serde(default)]
    pub shelters: Vec<Shelter>,
    /// Fraction of the dry-bulb/wet-bulb gap removed by evaporation (0-1)
    #[serde(default)]
    pub evaporative_cooling_effectiveness: f64,
    /// Scale applied to the boundary wind speed
    #[serde(default = "default_wind_speed_multiplier")]
    pub wind_speed_multiplier: f64,
}

impl Typology {
    /// Open ground with no shelter or cooling
    pub fn openfield() -> Self {
        Self {
            name: "Openfield".to_string(),
            shelters: Vec::new(),
            evaporative_cooling_effectiveness: 0.0,
            wind_speed_multiplier: 1.0,
        }
    }

    /// Check every parameter and that no two shelters overlap
    ///
    /// # Errors
    /// Returns `InvalidInput` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ComfortError::invalid_input("typology name is empty"));
        }
        if !(0.0..=1.0).contains(&self.evaporative_cooling_effectiveness) {
            return Err(ComfortError::invalid_input(format!(
                "typology '{}': evaporative cooling effectiveness must be within 0-1, got {}",
                self.name, self.evaporative_cooling_effectiveness
            )));
        }
        if !(self.wind_speed_multiplier.is_finite() && self.wind_speed_multiplier >= 0.0) {
            return Err(ComfortError::invalid_input(format!(
                "typology '{}': wind speed multiplier must be >= 0, got {}",
                self.name, self.wind_speed_multiplier
            )));
        }
        for shelter in &self.shelters {
            shelter.validate()?;
        }
        check_overlaps(&self.shelters)
            .map_err(|e| ComfortError::invalid_input(format!("typology '{}': {e}", self.name)))
    }

    /// Proportion of sky seen through and around the shelters (0-1)
    pub fn sky_visibility(&self) -> f64 {
        let (open, through) = self
            .shelters
            .iter()
            .fold((1.0, 0.0), |(open, through), s| {
                let occluded = s.sky_occluded();
                (open - occluded, through + occluded * s.porosity)
            });
        (open + through).clamp(0.0, 1.0)
    }

    /// Sun exposure (0 hidden, 1 exposed) for a sun at (`altitude`, `azimuth`)
    ///
    /// `None` when the sun is below the horizon.
    pub fn sun_exposure(&self, altitude: f64, azimuth: f64) -> Option<f64> {
        if altitude <= 0.0 {
            return None;
        }
        Some(
            self.shelters
                .iter()
                .map(|s| if s.blocks_sun(altitude, azimuth) { s.porosity } else { 1.0 })
                .fold(1.0, f64::min),
        )
    }

    /// Wind speed inside the typology
    pub fn effective_wind_speed(&self, speed: f64, direction: f64) -> f64 {
        self.shelters
            .iter()
            .map(|s| s.effective_wind_speed(speed, direction))
            .fold(speed, f64::min)
            * self.wind_speed_multiplier
    }
}

/// An ordered set of typologies with unique names
#[derive(Debug, Clone, PartialEq)]
pub struct TypologyCatalog {
    typologies: Vec<Typology>,
}

impl TypologyCatalog {
    /// Build from typologies, validating each
    ///
    /// # Errors
    /// Returns `InvalidInput` for an invalid typology or a repeated name.
    pub fn new(typologies: Vec<Typology>) -> Result<Self> {
        let mut names = std::collections::BTreeSet::new();
        for typology in &typologies {
            typology.validate()?;
            if !names.insert(typology.name.as_str()) {
                return Err(ComfortError::invalid_input(format!(
                    "typology name '{}' is not unique",
                    typology.name
                )));
            }
        }
        Ok(Self { typologies })
    }

    /// The presets shipped with the crate
    ///
    /// # Errors
    /// Only fails if the embedded data is corrupt.
    pub fn presets() -> Result<Self> {
        Self::from_json_str(DEFAULT_CATALOG)
    }

    /// Parse a JSON array of typologies
    ///
    /// # Errors
    /// Returns `Json` on malformed JSON and `InvalidInput` for invalid entries.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let typologies: Vec<Typology> = serde_json::from_str(json)?;
        Self::new(typologies)
    }

    /// Read a JSON array of typologies from disk
    ///
    /// # Errors
    /// As [`Self::from_json_str`], plus IO errors.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let catalog = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), count = catalog.len(), "Loaded typology catalog");
        Ok(catalog)
    }

    /// Typology called `name`
    pub fn get(&self, name: &str) -> Option<&Typology> {
        self.typologies.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.typologies.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn typologies(&self) -> &[Typology] {
        &self.typologies
    }

    pub fn len(&self) -> usize {
        self.typologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typologies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets_load_and_validate() {
        let catalog = TypologyCatalog::presets().unwrap();
        assert_eq!(catalog.len(), 26);
        assert_eq!(catalog.names()[0], "Openfield");
        assert_eq!(catalog.get("Openfield"), Some(&Typology::openfield()));
        let pdec = catalog.get("PDEC").unwrap();
        assert_relative_eq!(pdec.evaporative_cooling_effectiveness, 0.7);
        assert_relative_eq!(pdec.wind_speed_multiplier, 0.5);
        assert_eq!(catalog.get("East-west shelter").unwrap().shelters.len(), 2);
        assert!(catalog.get("Nowhere").is_none());
    }

    #[test]
    fn test_sky_visibility() {
        let catalog = TypologyCatalog::presets().unwrap();
        assert_relative_eq!(catalog.get("Openfield").unwrap().sky_visibility(), 1.0);
        assert_relative_eq!(catalog.get("Enclosed").unwrap().sky_visibility(), 0.0);
        assert_relative_eq!(catalog.get("Porous enclosure").unwrap().sky_visibility(), 0.5);
        assert_relative_eq!(catalog.get("Misting").unwrap().sky_visibility(), 1.0);
    }

    #[test]
    fn test_sun_and_wind_through_shelters() {
        let catalog = TypologyCatalog::presets().unwrap();
        let south = catalog.get("South shelter").unwrap();
        assert_eq!(south.sun_exposure(30.0, 180.0), Some(0.0));
        assert_eq!(south.sun_exposure(30.0, 90.0), Some(1.0));
        assert_eq!(south.sun_exposure(-1.0, 180.0), None);
        assert_eq!(south.effective_wind_speed(4.0, 180.0), 0.0);
        assert_eq!(south.effective_wind_speed(4.0, 0.0), 4.0);

        let misting = catalog.get("Misting").unwrap();
        assert_eq!(misting.effective_wind_speed(4.0, 0.0), 2.0);
    }

    #[test]
    fn test_rejects_overlap_and_duplicates() {
        let json = r#"[{"name": "bad", "shelters": [
            {"altitude_range": [0, 90], "azimuth_range": [0, 180], "porosity": 0},
            {"altitude_range": [0, 90], "azimuth_range": [90, 270], "porosity": 0}
        ]}]"#;
        assert!(matches!(
            TypologyCatalog::from_json_str(json),
            Err(ComfortError::InvalidInput { .. })
        ));

        let twice = vec![Typology::openfield(), Typology::openfield()];
        assert!(TypologyCatalog::new(twice).is_err());
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let catalog = TypologyCatalog::from_json_str(r#"[{"name": "bare"}]"#).unwrap();
        let bare = catalog.get("bare").unwrap();
        assert!(bare.shelters.is_empty());
        assert_eq!(bare.evaporative_cooling_effectiveness, 0.0);
        assert_eq!(bare.wind_speed_multiplier, 1.0);
    }
}
