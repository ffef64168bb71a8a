pub mod chart;
pub mod config;
pub mod convert;
pub mod error;
pub mod grid;
pub mod pitch;
pub mod rules;
pub mod sequence;

pub use chart::render;
pub use config::{Config, PlayerSpec};
pub use convert::{build_grid, convert, convert_file, BeatChart, Conversion};
pub use error::*;
pub use grid::Grid;
pub use pitch::{classify, note_name_to_number, number_to_note_name, PitchBand, Threshold};
pub use rules::{active_rules, applicable_rules, BandThresholds, RoutingRule};
pub use sequence::{EventKind, NoteEvent, Sequence, Track};
