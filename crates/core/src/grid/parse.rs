//! Parsers for the plain-text radiance result formats

use crate::core_types::Point2;
use crate::error::{ComfortError, Result};
use crate::weather::HOURS_PER_YEAR;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> ComfortError {
    ComfortError::Parse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

/// Whitespace-separated floats of one line
fn parse_floats(path: &Path, line_no: usize, line: &str) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| parse_error(path, line_no, format!("'{token}' is not a number")))
        })
        .collect()
}

/// Visit every non-blank line with its 1-based number
fn for_each_line<F>(path: &Path, mut f: F) -> Result<()>
where
    F: FnMut(usize, &str) -> Result<()>,
{
    let reader = BufReader::new(File::open(path)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        f(i + 1, trimmed)?;
    }
    Ok(())
}

/// Sensor positions from `.pts` files (`x y z dx dy dz` per line)
///
/// Files are read in the given order and concatenated; only x and y are kept.
///
/// # Errors
/// Returns `Parse` on a line with fewer than three numbers.
pub fn parse_points(files: &[impl AsRef<Path>]) -> Result<Vec<Point2>> {
    let mut points = Vec::new();
    for file in files {
        let path = file.as_ref();
        for_each_line(path, |line_no, line| {
            let values = parse_floats(path, line_no, line)?;
            if values.len() < 3 {
                return Err(parse_error(
                    path,
                    line_no,
                    format!("expected at least x y z, found {} values", values.len()),
                ));
            }
            points.push(Point2::new(values[0], values[1]));
            Ok(())
        })?;
    }
    Ok(points)
}

/// Sky-view percentages from a `.res` file, one value per line
///
/// # Errors
/// Returns `Parse` on a non-numeric line or a value outside 0-100.
pub fn parse_sky_view(file: &Path) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for_each_line(file, |line_no, line| {
        let parsed = parse_floats(file, line_no, line)?;
        match parsed.as_slice() {
            [v] if (0.0..=100.0).contains(v) => {
                values.push(*v);
                Ok(())
            }
            [v] => Err(parse_error(
                file,
                line_no,
                format!("sky view {v} is outside 0-100%"),
            )),
            _ => Err(parse_error(file, line_no, "expected one value per line")),
        }
    })?;
    Ok(values)
}

/// Hour-of-year of every irradiance column
///
/// Radiance writes fractional hours (e.g. `12.5` for the middle of hour 12).
///
/// # Errors
/// Returns `Parse` on a value outside the reference year.
pub fn parse_sun_up_hours(file: &Path) -> Result<Vec<usize>> {
    let mut hours = Vec::new();
    for_each_line(file, |line_no, line| {
        for value in parse_floats(file, line_no, line)? {
            let hour = value.floor();
            if !(0.0..HOURS_PER_YEAR as f64).contains(&hour) {
                return Err(parse_error(
                    file,
                    line_no,
                    format!("sun-up hour {value} is outside the year"),
                ));
            }
            hours.push(hour as usize);
        }
        Ok(())
    })?;
    Ok(hours)
}

/// Annual total irradiance as an hour-major (8760 × N) array
///
/// Each `.ill` line holds one sensor point and one column per sun-up hour.
/// Hours with no column are zero.
///
/// # Returns
/// `(values, n_points)` with `values[hour * n_points + point]`
///
/// # Errors
/// Returns `Parse` on a non-numeric token or a row whose width differs from
/// the number of sun-up hours.
pub fn parse_irradiance(files: &[impl AsRef<Path>], sun_up_hours: &[usize]) -> Result<(Vec<f64>, usize)> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for file in files {
        let path = file.as_ref();
        for_each_line(path, |line_no, line| {
            let values = parse_floats(path, line_no, line)?;
            if values.len() != sun_up_hours.len() {
                return Err(parse_error(
                    path,
                    line_no,
                    format!(
                        "expected {} sun-up hour values, found {}",
                        sun_up_hours.len(),
                        values.len()
                    ),
                ));
            }
            rows.push(values);
            Ok(())
        })?;
    }

    let n_points = rows.len();
    let mut matrix = vec![0.0; HOURS_PER_YEAR * n_points];
    for (point, row) in rows.iter().enumerate() {
        for (column, &hour) in sun_up_hours.iter().enumerate() {
            matrix[hour * n_points + point] = row[column];
        }
    }
    Ok((matrix, n_points))
}
