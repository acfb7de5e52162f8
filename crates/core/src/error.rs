//! Error handling for the comfort engine
//!
//! A single `ComfortError` enum covers every failure the engine surfaces to a
//! caller. Numeric edge conditions (zero-width normalisation ranges, humidity
//! pushed past saturation) never reach this type; they are absorbed where they
//! occur.
//!
//! # Example
//!
//! ```
//! use comfort_sim_core::error::{ComfortError, Result};
//!
//! fn check_month(month: u32) -> Result<()> {
//!     if !(1..=12).contains(&month) {
//!         return Err(ComfortError::invalid_input(format!(
//!             "month must be between 1 and 12 inclusive, got {month}"
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_month(13).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ComfortError>;

/// Errors raised by the comfort engine
#[derive(Error, Debug)]
pub enum ComfortError {
    /// Required simulation artifacts are absent or ambiguous
    #[error("missing simulation data: {message}")]
    MissingData {
        /// What is missing and where it was looked for
        message: String,
    },

    /// Caller-supplied values are out of range or inconsistent
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Why the input was rejected
        message: String,
    },

    /// A raw artifact file could not be parsed
    #[error("failed to parse {}: line {line}: {message}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// The moisture-source sidecar exists but cannot be used
    #[error("malformed moisture sources in {}: {message}", path.display())]
    MalformedMoistureSources {
        /// Sidecar path
        path: PathBuf,
        /// Description of the problem
        message: String,
    },

    /// A cache entry could not be encoded, decoded or written
    #[error("cache entry '{key}': {message}")]
    Cache {
        /// Cache key (matrix name)
        key: String,
        /// Description of the problem
        message: String,
    },

    /// Underlying IO failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure for configuration or boundary files
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ComfortError {
    /// Shorthand for [`ComfortError::MissingData`]
    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::MissingData {
            message: message.into(),
        }
    }

    /// Shorthand for [`ComfortError::InvalidInput`]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for [`ComfortError::Cache`]
    pub fn cache(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            key: key.into(),
            message: message.into(),
        }
    }
}
