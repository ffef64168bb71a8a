//! # Rule Resolution
//!
//! A [`RoutingRule`] routes notes from tracks whose name contains a keyword to one player,
//! for a range of measures, above a velocity floor.
//!
//! Resolution happens in two steps:
//! 1. [`applicable_rules`] - once per track, by case-insensitive name containment
//! 2. [`active_rules`] - once per note, by measure range and velocity
//!
//! Every qualifying rule is returned; one note may feed several players at once.
//!
//! ## Measure Numbering
//! Configured measures are 1-based while note positions are 0-based, so a rule is active
//! when `start_measure <= current_measure + 1 < end_measure`, with `current_measure` the
//! real-valued position `tick / ticks_per_measure`.

use tracing::debug;

use crate::pitch::Threshold;

pub const DEFAULT_START_MEASURE: i64 = 0;
pub const DEFAULT_END_MEASURE: i64 = 99999;

/// Low and high thresholds used to classify a note into a [`crate::PitchBand`].
#[derive(Debug, Clone, PartialEq)]
pub struct BandThresholds {
    pub low: Threshold,
    pub high: Threshold,
}

/// A fully resolved routing rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRule {
    pub player_index: usize,
    pub track_name_contains: String,
    /// Inclusive, 1-based
    pub start_measure: i64,
    /// Exclusive, 1-based
    pub end_measure: i64,
    pub min_velocity: u8,
    /// `None` when the configuration gave no usable mapping; such a rule never activates.
    pub bands: Option<BandThresholds>,
}

impl RoutingRule {
    /// Case-insensitive containment match against a track name. An empty keyword never matches.
    pub fn matches_track(&self, track_name: &str) -> bool {
        let keyword = self.track_name_contains.to_lowercase();
        !keyword.is_empty() && track_name.to_lowercase().contains(&keyword)
    }

    pub fn covers_measure(&self, current_measure: f64) -> bool {
        let position = current_measure + 1.0;
        self.start_measure as f64 <= position && position < self.end_measure as f64
    }

    pub fn accepts_velocity(&self, velocity: u8) -> bool {
        velocity >= self.min_velocity
    }
}

/// Rules whose keyword appears in `track_name`, in configuration order.
///
/// An empty result means the track should be skipped.
pub fn applicable_rules<'a>(track_name: &str, rules: &'a [RoutingRule]) -> Vec<&'a RoutingRule> {
    let applicable: Vec<&RoutingRule> = rules
        .iter()
        .filter(|rule| rule.matches_track(track_name))
        .collect();
    debug!(track = track_name, count = applicable.len(), "applicable rules");
    applicable
}

/// Rules that apply to a single note at `tick` with `velocity`.
pub fn active_rules<'a>(
    tick: u64,
    velocity: u8,
    applicable: &[&'a RoutingRule],
    ticks_per_measure: f64,
) -> Vec<&'a RoutingRule> {
    let current_measure = tick as f64 / ticks_per_measure;
    applicable
        .iter()
        .copied()
        .filter(|rule| {
            rule.bands.is_some()
                && rule.covers_measure(current_measure)
                && rule.accepts_velocity(velocity)
        })
        .collect()
}
