//! Append-only log of the slider values seen by each run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::params::SliderValues;

/// Line written when the host supplied no slider values.
pub const ABSENT_MARKER: &str = "None";

/// Errors appending to the slider log.
#[derive(Debug, Error)]
pub enum SliderLogError {
    #[error("failed to append to slider log {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode slider values")]
    Encode(#[from] serde_json::Error),
}

/// Slider log file. Each [`append`](Self::append) adds exactly one line and
/// leaves earlier lines untouched.
#[derive(Debug, Clone)]
pub struct SliderLog {
    path: PathBuf,
}

impl SliderLog {
    /// A log writing to `path`. Nothing is opened until the first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line: the slider values as compact JSON with sorted keys,
    /// or [`ABSENT_MARKER`] when there are none. Creates the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SliderLogError::Io`] if the file cannot be opened or written.
    pub fn append(&self, sliders: Option<&SliderValues>) -> Result<(), SliderLogError> {
        let line = match sliders {
            Some(values) => serde_json::to_string(values)?,
            None => ABSENT_MARKER.to_owned(),
        };

        let io_err = |source| SliderLogError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        writeln!(file, "{line}").map_err(io_err)
    }
}
