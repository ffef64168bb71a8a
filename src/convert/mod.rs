//! # Conversion Pipeline
//!
//! Turns a decoded [`Sequence`] into a BeatJam chart.
//!
//! ## Pipeline
//! 1. For each track, find the rules whose keyword appears in the track name
//!    (tracks with none are skipped)
//! 2. For each note start, find the active rules (measure range, velocity floor)
//! 3. Classify the note per rule and record the band in a per-track [`Grid`]
//! 4. Merge the per-track grids
//! 5. Render the merged grid, or report that nothing was generated
//!
//! ## Example
//! ```rust
//! use beatgrid::{convert, Conversion, Sequence};
//! # fn run(sequence: &Sequence, config: &beatgrid::Config) -> Result<(), beatgrid::GridError> {
//! match convert(sequence, &config.rules, &config.players)? {
//!     Conversion::Generated(chart) => println!("{}", chart.to_text()),
//!     Conversion::NothingGenerated => eprintln!("no rule matched any note"),
//! }
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info};

use crate::chart::render;
use crate::config::{Config, PlayerSpec};
use crate::error::GridError;
use crate::grid::Grid;
use crate::rules::{active_rules, applicable_rules, RoutingRule};
use crate::sequence::{Sequence, Track};


/// Rendered chart lines.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatChart {
    pub lines: Vec<String>,
}

impl BeatChart {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines joined with `\n`, without a trailing newline.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Result of a conversion run.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Generated(BeatChart),
    /// No note produced any grid entry; nothing should be written.
    NothingGenerated,
}

/// Build the grid for a single track.
///
/// Returns an empty grid when no rule applies to the track.
pub fn grid_for_track(
    track: &Track,
    rules: &[RoutingRule],
    ticks_per_sixteenth: f64,
    ticks_per_measure: f64,
) -> Result<Grid, GridError> {
    let mut grid = Grid::new();

    let applicable = applicable_rules(&track.name, rules);
    if applicable.is_empty() {
        return Ok(grid);
    }
    info!(
        track = %track.name,
        rules = applicable.len(),
        "processing track"
    );

    for event in track.events.iter().filter(|e| e.is_note_start()) {
        let active = active_rules(event.tick, event.velocity, &applicable, ticks_per_measure);
        if active.is_empty() {
            continue;
        }
        grid.ingest(event, &active, ticks_per_sixteenth)?;
    }

    Ok(grid)
}

/// Aggregate every track of `sequence` into one grid.
pub fn build_grid(sequence: &Sequence, rules: &[RoutingRule]) -> Result<Grid, GridError> {
    let mut grid = Grid::new();
    for track in &sequence.tracks {
        let partial = grid_for_track(
            track,
            rules,
            sequence.ticks_per_sixteenth(),
            sequence.ticks_per_measure(),
        )?;
        debug!(track = %track.name, empty = partial.is_empty(), "track aggregated");
        grid.merge(partial);
    }
    Ok(grid)
}

/// Convert a sequence into a chart.
///
/// # Errors
/// Returns [`GridError::InvalidNoteName`] if a rule used during the run has a threshold
/// that is not a valid note name.
pub fn convert(
    sequence: &Sequence,
    rules: &[RoutingRule],
    players: &[PlayerSpec],
) -> Result<Conversion, GridError> {
    let grid = build_grid(sequence, rules)?;
    if grid.is_empty() {
        info!("no grid entries generated");
        return Ok(Conversion::NothingGenerated);
    }

    let chart = BeatChart {
        lines: render(grid, players),
    };
    info!(lines = chart.line_count(), "chart rendered");
    Ok(Conversion::Generated(chart))
}

/// Load the input file named by `config` and convert it.
pub fn convert_file(config: &Config) -> Result<Conversion, GridError> {
    let input = config.input_path()?;
    info!(input = ?input, "converting");
    let sequence = Sequence::load(&input)?;
    convert(&sequence, &config.rules, &config.players)
}
