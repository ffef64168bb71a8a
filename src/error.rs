//! # Error Types
//!
//! This module defines all error types for the beat grid converter.
//!
//! Every error carries the offending value (note name, file path, decoder message) so the
//! user can fix the configuration or input file without guessing.
//!
//! ## Error Types
//! - `InvalidNoteName` - A band threshold is not a recognizable note name
//! - `MidiError` - The sequence file could not be decoded
//! - `UnsupportedTiming` - The sequence uses timecode timing instead of ticks per quarter
//! - `ConfigError` - The configuration could not be parsed or validated
//! - `Io` - Reading or writing a file failed
//!
//! A track with no matching rule and a run that produces an empty grid are not errors;
//! see [`crate::Conversion::NothingGenerated`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    /// Malformed note name passed to the codec.
    ///
    /// # Example
    /// ```
    /// # use beatgrid::GridError;
    /// let err = GridError::InvalidNoteName {
    ///     name: "H4".to_string(),
    ///     reason: "unknown note 'H'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid note name 'H4': unknown note 'H'");
    /// ```
    #[error("Invalid note name '{name}': {reason}")]
    InvalidNoteName { name: String, reason: String },

    /// The sequence decoder rejected the file contents.
    #[error("MIDI error: {0}")]
    MidiError(String),

    /// Timecode (SMPTE) files have no quarter-note resolution to quantize against.
    #[error("Unsupported timing: {0}")]
    UnsupportedTiming(String),

    /// Invalid or incomplete configuration.
    ///
    /// # Example
    /// ```
    /// # use beatgrid::GridError;
    /// let err = GridError::ConfigError("no rules found".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: no rules found");
    /// ```
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
