//! Discovery of raw radiance artifacts in a simulation directory

use crate::cache::Fingerprint;
use crate::error::{ComfortError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the folders radiance leaves behind after post-processing
const TEMP_RESULTS_DIR: &str = "initial_results";

/// Paths of the raw artifacts that describe one sensor grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridArtifacts {
    /// `sky_view/model/grid/*.pts`, sorted by name
    pub points_files: Vec<PathBuf>,
    /// `annual_irradiance/results/total/*.ill`, sorted by name
    pub irradiance_files: Vec<PathBuf>,
    /// `annual_irradiance/results/total/sun-up-hours.txt`
    pub sun_up_hours_file: PathBuf,
    /// The single `sky_view/results/*.res`
    pub sky_view_file: PathBuf,
}

impl GridArtifacts {
    /// Locate and check every artifact under `simulation_dir`
    ///
    /// # Errors
    /// Returns `MissingData` if a directory or file is absent, or if more
    /// than one sky-view result exists (the grid would be ambiguous).
    pub fn discover(simulation_dir: &Path) -> Result<Self> {
        let irradiance_dir = simulation_dir.join("annual_irradiance");
        let total_dir = irradiance_dir.join("results").join("total");
        let irradiance_files = files_with_extension(&total_dir, "ill")?;
        if irradiance_files.is_empty() {
            return Err(ComfortError::missing_data(format!(
                "annual-irradiance data is not available in {}",
                irradiance_dir.display()
            )));
        }
        let sun_up_hours_file = total_dir.join("sun-up-hours.txt");
        if !sun_up_hours_file.is_file() {
            return Err(ComfortError::missing_data(format!(
                "sun-up hours are not available at {}",
                sun_up_hours_file.display()
            )));
        }

        let sky_view_dir = simulation_dir.join("sky_view");
        let mut res_files = files_with_extension(&sky_view_dir.join("results"), "res")?;
        if res_files.is_empty() {
            return Err(ComfortError::missing_data(format!(
                "sky-view data is not available in {}",
                sky_view_dir.display()
            )));
        }
        if res_files.len() > 1 {
            let stems: Vec<String> = res_files
                .iter()
                .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .collect();
            return Err(ComfortError::missing_data(format!(
                "only a single analysis grid is supported, found multiple sky-view results {stems:?}"
            )));
        }
        let sky_view_file = res_files.remove(0);

        let points_files =
            files_with_extension(&sky_view_dir.join("model").join("grid"), "pts")?;
        if points_files.is_empty() {
            return Err(ComfortError::missing_data(format!(
                "sensor points are not available in {}",
                sky_view_dir.join("model").join("grid").display()
            )));
        }

        debug!(
            points = points_files.len(),
            irradiance = irradiance_files.len(),
            "Discovered grid artifacts"
        );
        Ok(Self {
            points_files,
            irradiance_files,
            sun_up_hours_file,
            sky_view_file,
        })
    }

    /// Fingerprint of the point files
    pub fn points_fingerprint(&self) -> Fingerprint {
        self.points_files
            .iter()
            .fold(Fingerprint::builder().str("points"), |b, p| b.file(p))
            .finish()
    }

    /// Fingerprint of the irradiance files and their hour map
    pub fn irradiance_fingerprint(&self) -> Fingerprint {
        self.irradiance_files
            .iter()
            .fold(Fingerprint::builder().str("total_irradiance"), |b, p| b.file(p))
            .file(&self.sun_up_hours_file)
            .finish()
    }

    /// Fingerprint of the sky-view result
    pub fn sky_view_fingerprint(&self) -> Fingerprint {
        Fingerprint::builder()
            .str("sky_view")
            .file(&self.sky_view_file)
            .finish()
    }
}

/// Files directly inside `dir` with the given extension, sorted by name
///
/// A missing directory yields an empty list.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Delete every `initial_results` directory below `simulation_dir`
///
/// # Returns
/// Number of directories removed
///
/// # Errors
/// Returns an IO error if a directory cannot be listed or removed.
pub fn remove_temp_files(simulation_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let mut pending = vec![simulation_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            if entry.file_name() == TEMP_RESULTS_DIR {
                fs::remove_dir_all(&path)?;
                removed += 1;
            } else {
                pending.push(path);
            }
        }
    }
    if removed > 0 {
        info!(removed, dir = %simulation_dir.display(), "Removed temporary radiance results");
    }
    Ok(removed)
}
