//! # Pitch Module
//!
//! Note-name codec and Low/Mid/High band classification.
//!
//! ## Octave Convention
//! Note numbers follow the FL Studio convention: `number = octave * 12 + offset`, so
//! C5 = 60 and C4 = 48. This is one octave above scientific pitch numbering.
//!
//! | Name | Number |
//! |------|--------|
//! | C-1  | -12    |
//! | C0   | 0      |
//! | C4   | 48     |
//! | C5   | 60     |
//! | F#3  | 42     |
//!
//! ## Example
//! ```rust
//! use beatgrid::pitch::{classify, note_name_to_number, PitchBand, Threshold};
//!
//! assert_eq!(note_name_to_number("C5")?, 60);
//!
//! let low = Threshold::Name("C4".to_string());
//! let high = Threshold::Name("C4".to_string());
//! assert_eq!(classify(60, &low, &high)?, PitchBand::High);
//! # Ok::<(), beatgrid::GridError>(())
//! ```

use std::fmt;

use serde::Deserialize;

use crate::error::GridError;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Coarse pitch classification of a note relative to two thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchBand {
    Low,
    Mid,
    High,
}

impl PitchBand {
    /// Order in which bands are written inside a chart cell.
    pub const RENDER_ORDER: [PitchBand; 3] = [PitchBand::High, PitchBand::Low, PitchBand::Mid];

    pub fn letter(self) -> char {
        match self {
            PitchBand::Low => 'L',
            PitchBand::Mid => 'M',
            PitchBand::High => 'H',
        }
    }
}

impl fmt::Display for PitchBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A band boundary as written in the configuration: either a note name or a raw number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Number(i32),
    Name(String),
}

impl Threshold {
    /// Resolve to a note number. Numbers pass through unchanged.
    pub fn resolve(&self) -> Result<i32, GridError> {
        match self {
            Threshold::Number(n) => Ok(*n),
            Threshold::Name(name) => note_name_to_number(name),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Number(n) => write!(f, "{}", n),
            Threshold::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Semitone offset within the octave for an uppercased note spelling.
fn note_offset(note: &str) -> Option<i32> {
    let offset = match note {
        "C" => 0,
        "C#" | "DB" => 1,
        "D" => 2,
        "D#" | "EB" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "GB" => 6,
        "G" => 7,
        "G#" | "AB" => 8,
        "A" => 9,
        "A#" | "BB" => 10,
        "B" => 11,
        _ => return None,
    };
    Some(offset)
}

/// Convert a note name such as `F#3`, `Gb5` or `C-1` to its note number.
///
/// Matching is case-insensitive. The name must end with a signed integer octave.
///
/// # Examples
/// ```
/// use beatgrid::pitch::note_name_to_number;
///
/// assert_eq!(note_name_to_number("C5").unwrap(), 60);
/// assert_eq!(note_name_to_number("f#3").unwrap(), 42);
/// assert_eq!(note_name_to_number("Gb3").unwrap(), 42);
/// assert_eq!(note_name_to_number("C-1").unwrap(), -12);
/// assert!(note_name_to_number("C").is_err());
/// ```
///
/// # Errors
/// Returns [`GridError::InvalidNoteName`] if the octave is missing or the note spelling
/// is not one of the twelve recognized ones.
pub fn note_name_to_number(name: &str) -> Result<i32, GridError> {
    let normalized = name.trim().to_uppercase();

    let split = normalized
        .find(|c: char| c.is_ascii_digit() || c == '-')
        .ok_or_else(|| GridError::InvalidNoteName {
            name: name.to_string(),
            reason: "missing octave number".to_string(),
        })?;
    let (note, octave) = normalized.split_at(split);

    let octave: i32 = octave.parse().map_err(|_| GridError::InvalidNoteName {
        name: name.to_string(),
        reason: format!("invalid octave '{}'", octave),
    })?;
    let offset = note_offset(note).ok_or_else(|| GridError::InvalidNoteName {
        name: name.to_string(),
        reason: format!("unknown note '{}'", note),
    })?;

    octave
        .checked_mul(12)
        .and_then(|n| n.checked_add(offset))
        .ok_or_else(|| GridError::InvalidNoteName {
            name: name.to_string(),
            reason: "octave out of range".to_string(),
        })
}

/// Convert a note number back to a name, always spelling accidentals as sharps.
///
/// ```
/// use beatgrid::pitch::number_to_note_name;
///
/// assert_eq!(number_to_note_name(60), "C5");
/// assert_eq!(number_to_note_name(42), "F#3");
/// assert_eq!(number_to_note_name(-1), "B-1");
/// ```
pub fn number_to_note_name(number: i32) -> String {
    let octave = number.div_euclid(12);
    let note = SHARP_NAMES[number.rem_euclid(12) as usize];
    format!("{}{}", note, octave)
}

/// Classify a note number against a low and a high threshold.
///
/// Notes strictly below `low` are [`PitchBand::Low`], strictly above `high` are
/// [`PitchBand::High`]; both thresholds themselves fall in [`PitchBand::Mid`].
pub fn classify(note: i32, low: &Threshold, high: &Threshold) -> Result<PitchBand, GridError> {
    let low = low.resolve()?;
    let high = high.resolve()?;

    let band = if note < low {
        PitchBand::Low
    } else if note > high {
        PitchBand::High
    } else {
        PitchBand::Mid
    };
    Ok(band)
}
