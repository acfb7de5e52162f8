//! Moisture sources read from the simulation directory

use crate::cache::FingerprintBuilder;
use crate::core_types::Point2;
use crate::error::{ComfortError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the moisture-source sidecar
pub const MOISTURE_SOURCES_FILE: &str = "moisture_sources.json";

/// Where a source emits from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceGeometry {
    /// A single emitter, e.g. a fountain or mister
    Point { location: Point2 },
    /// A water body; every boundary vertex emits
    Polygon { vertices: Vec<Point2> },
}

/// A static source of evaporative cooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoistureSource {
    /// Unique name, used for the cache key
    pub identifier: String,
    /// Evaporative cooling effectiveness at the emitter (>= 0)
    pub magnitude: f64,
    pub geometry: SourceGeometry,
}

impl MoistureSource {
    /// Point source
    pub fn point(identifier: impl Into<String>, magnitude: f64, location: Point2) -> Self {
        Self {
            identifier: identifier.into(),
            magnitude,
            geometry: SourceGeometry::Point { location },
        }
    }

    /// Polygon source
    pub fn polygon(identifier: impl Into<String>, magnitude: f64, vertices: Vec<Point2>) -> Self {
        Self {
            identifier: identifier.into(),
            magnitude,
            geometry: SourceGeometry::Polygon { vertices },
        }
    }

    /// Locations the plume is emitted from
    pub fn emitters(&self) -> &[Point2] {
        match &self.geometry {
            SourceGeometry::Point { location } => std::slice::from_ref(location),
            SourceGeometry::Polygon { vertices } => vertices,
        }
    }

    /// Identifier with every character outside `[A-Za-z0-9_-]` replaced by `_`
    pub fn path_safe_id(&self) -> String {
        self.identifier
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Cache key of this source's per-wind-state field
    pub fn cache_key(&self) -> String {
        format!("moisture_{}", self.path_safe_id())
    }

    /// Check magnitude and geometry
    ///
    /// # Errors
    /// Returns `InvalidInput` for a negative or non-finite magnitude, an empty
    /// identifier, a polygon without vertices or a non-finite coordinate.
    pub fn validate(&self) -> Result<()> {
        if self.identifier.trim().is_empty() {
            return Err(ComfortError::invalid_input("moisture source identifier is empty"));
        }
        if !(self.magnitude.is_finite() && self.magnitude >= 0.0) {
            return Err(ComfortError::invalid_input(format!(
                "moisture source '{}' magnitude must be finite and >= 0, got {}",
                self.identifier, self.magnitude
            )));
        }
        let emitters = self.emitters();
        if emitters.is_empty() {
            return Err(ComfortError::invalid_input(format!(
                "moisture source '{}' has no vertices",
                self.identifier
            )));
        }
        if emitters.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(ComfortError::invalid_input(format!(
                "moisture source '{}' has a non-finite coordinate",
                self.identifier
            )));
        }
        Ok(())
    }

    pub(crate) fn fingerprint(&self, builder: FingerprintBuilder) -> FingerprintBuilder {
        let coords: Vec<f64> = self.emitters().iter().flat_map(|p| [p.x, p.y]).collect();
        builder
            .str(&self.identifier)
            .f64(self.magnitude)
            .f64s(&coords)
    }
}

impl fmt::Display for MoistureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.geometry {
            SourceGeometry::Point { .. } => "point",
            SourceGeometry::Polygon { .. } => "polygon",
        };
        write!(f, "{} ({kind}, magnitude {})", self.identifier, self.magnitude)
    }
}

/// Read the sources of a simulation directory
///
/// A missing sidecar disables moisture modelling and yields an empty list.
///
/// # Errors
/// Returns `MalformedMoistureSources` if the file exists but cannot be parsed,
/// lists no sources, repeats a cache key or holds an invalid source.
pub fn load_moisture_sources(simulation_dir: &Path) -> Result<Vec<MoistureSource>> {
    let path = simulation_dir.join(MOISTURE_SOURCES_FILE);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                dir = %simulation_dir.display(),
                "No {MOISTURE_SOURCES_FILE} found, moisture-adjusted UTCI not possible"
            );
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    parse_moisture_sources(&path, &contents)
}

fn malformed(path: &Path, message: impl Into<String>) -> ComfortError {
    ComfortError::MalformedMoistureSources {
        path: PathBuf::from(path),
        message: message.into(),
    }
}

fn parse_moisture_sources(path: &Path, contents: &str) -> Result<Vec<MoistureSource>> {
    let sources: Vec<MoistureSource> =
        serde_json::from_str(contents).map_err(|e| malformed(path, e.to_string()))?;
    if sources.is_empty() {
        return Err(malformed(path, "no moisture sources found"));
    }
    let mut keys = std::collections::BTreeSet::new();
    for source in &sources {
        source.validate().map_err(|e| malformed(path, e.to_string()))?;
        if !keys.insert(source.cache_key()) {
            return Err(malformed(
                path,
                format!("identifier '{}' is not unique", source.identifier),
            ));
        }
    }
    info!(count = sources.len(), "Loaded moisture sources");
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCES: &str = r#"[
        {"identifier": "pond #1", "magnitude": 0.3,
         "geometry": {"type": "polygon", "vertices": [[0, 0], [4, 0], [4, 4]]}},
        {"identifier": "mister", "magnitude": 0.5,
         "geometry": {"type": "point", "location": [10, 2]}}
    ]"#;

    #[test]
    fn test_absent_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_moisture_sources(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_parses_points_and_polygons() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MOISTURE_SOURCES_FILE), SOURCES).unwrap();
        let sources = load_moisture_sources(dir.path()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].emitters().len(), 3);
        assert_eq!(sources[1].emitters(), &[Point2::new(10.0, 2.0)]);
        assert_eq!(sources[0].cache_key(), "moisture_pond__1");
    }

    #[test]
    fn test_empty_list_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MOISTURE_SOURCES_FILE), "[]").unwrap();
        let err = load_moisture_sources(dir.path()).unwrap_err();
        assert!(matches!(err, ComfortError::MalformedMoistureSources { .. }));
    }

    #[test]
    fn test_negative_magnitude_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MOISTURE_SOURCES_FILE),
            r#"[{"identifier": "x", "magnitude": -1,
                 "geometry": {"type": "point", "location": [0, 0]}}]"#,
        )
        .unwrap();
        assert!(load_moisture_sources(dir.path()).is_err());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MOISTURE_SOURCES_FILE),
            r#"[{"identifier": "a b", "magnitude": 0.1, "geometry": {"type": "point", "location": [0, 0]}},
                {"identifier": "a_b", "magnitude": 0.1, "geometry": {"type": "point", "location": [1, 0]}}]"#,
        )
        .unwrap();
        assert!(load_moisture_sources(dir.path()).is_err());
    }
}
