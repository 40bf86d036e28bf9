//! Glass model configuration: parameter defaults, reported ranges and the
//! slider log location.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location of the slider log, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "sliders_value_glass.log";

/// Errors loading a [`GlassConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config")]
    Parse(#[from] serde_json::Error),
}

/// Default value and host-facing range of one parameter.
///
/// The range is reported to the host only; it never clamps or rejects a
/// resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Value used when the sliders cannot be resolved.
    pub default: i64,
    /// Lower end of the reported range.
    pub min: i64,
    /// Upper end of the reported range.
    pub max: i64,
}

impl ParamSpec {
    /// Creates a spec from its default and range.
    #[must_use]
    pub const fn new(default: i64, min: i64, max: i64) -> Self {
        Self { default, min, max }
    }
}

/// Configuration of a glass model run.
///
/// Every field is optional in serialized form; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlassConfig {
    /// Body and base radius.
    pub body_radius: ParamSpec,
    /// Body height.
    pub body_height: ParamSpec,
    /// Slider log location.
    pub log_path: PathBuf,
}

impl Default for GlassConfig {
    fn default() -> Self {
        Self {
            body_radius: ParamSpec::new(80, 1, 300),
            body_height: ParamSpec::new(300, 10, 500),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl GlassConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid JSON or
    /// does not match the configuration shape.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Replaces the slider log location.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }
}
