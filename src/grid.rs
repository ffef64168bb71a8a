//! # Grid Aggregation
//!
//! The [`Grid`] maps `(slot, player)` to the set of [`PitchBand`]s hit there. A slot is one
//! sixteenth note: slot 16 is the first sixteenth of the second measure.
//!
//! ## Quantization
//! `slot = round(tick / ticks_per_sixteenth)`, using [`f64::round`], which rounds half-way
//! cases away from zero. Ticks are never negative, so a tie always rounds up.
//!
//! ## Merging
//! Inserts are set unions, so partial grids built independently (one per track) can be
//! combined with [`Grid::merge`] in any order with the same result.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GridError;
use crate::pitch::{classify, PitchBand};
use crate::rules::RoutingRule;
use crate::sequence::NoteEvent;

pub const SIXTEENTHS_PER_BEAT: u32 = 4;
pub const BEATS_PER_MEASURE: u32 = 4;
pub const SLOTS_PER_MEASURE: u32 = SIXTEENTHS_PER_BEAT * BEATS_PER_MEASURE;

/// Position of a slot in measure / beat / sixteenth terms, all 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPosition {
    pub measure: u32,
    pub beat: u32,
    pub sixteenth: u32,
}

impl SlotPosition {
    pub fn from_slot(slot: u32) -> Self {
        let within_measure = slot % SLOTS_PER_MEASURE;
        Self {
            measure: slot / SLOTS_PER_MEASURE,
            beat: within_measure / SIXTEENTHS_PER_BEAT,
            sixteenth: within_measure % SIXTEENTHS_PER_BEAT,
        }
    }
}

/// Quantize a tick position to the nearest sixteenth-note slot.
pub fn slot_index(tick: u64, ticks_per_sixteenth: f64) -> u32 {
    (tick as f64 / ticks_per_sixteenth).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    cells: BTreeMap<u32, BTreeMap<usize, BTreeSet<PitchBand>>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `band` to the cell at `(slot, player)`. Inserting an existing band is a no-op.
    pub fn insert(&mut self, slot: u32, player: usize, band: PitchBand) {
        self.cells
            .entry(slot)
            .or_default()
            .entry(player)
            .or_default()
            .insert(band);
    }

    /// Record one note against every active rule.
    ///
    /// Only note starts with a positive velocity are recorded; anything else leaves the
    /// grid untouched.
    ///
    /// # Errors
    /// Propagates [`GridError::InvalidNoteName`] if a rule's thresholds cannot be decoded.
    pub fn ingest(
        &mut self,
        event: &NoteEvent,
        active: &[&RoutingRule],
        ticks_per_sixteenth: f64,
    ) -> Result<(), GridError> {
        if !event.is_note_start() {
            return Ok(());
        }

        let slot = slot_index(event.tick, ticks_per_sixteenth);
        for rule in active {
            let Some(bands) = &rule.bands else {
                continue;
            };
            let band = classify(i32::from(event.note), &bands.low, &bands.high)?;
            self.insert(slot, rule.player_index, band);
        }
        Ok(())
    }

    /// Union another grid into this one, key by key.
    pub fn merge(&mut self, other: Grid) {
        for (slot, players) in other.cells {
            let target = self.cells.entry(slot).or_default();
            for (player, bands) in players {
                target.entry(player).or_default().extend(bands);
            }
        }
    }

    pub fn bands(&self, slot: u32, player: usize) -> Option<&BTreeSet<PitchBand>> {
        self.cells.get(&slot)?.get(&player)
    }

    /// Populated slots in ascending order, each with its players in ascending order.
    pub fn slots(&self) -> impl Iterator<Item = (u32, &BTreeMap<usize, BTreeSet<PitchBand>>)> {
        self.cells.iter().map(|(slot, players)| (*slot, players))
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .values()
            .all(|players| players.values().all(BTreeSet::is_empty))
    }
}
