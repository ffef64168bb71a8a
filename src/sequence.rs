//! # Sequence Decoding
//!
//! Reads a Standard MIDI File into an owned [`Sequence`]: the quarter-note resolution,
//! the detected tempo, and one [`Track`] per MIDI track with absolute tick positions.
//!
//! Only note on / note off messages are kept as events. Meta events are used for the track
//! name (first `TrackName`) and tempo (first `Tempo` found in any track); everything else is
//! dropped.
//!
//! ## Example
//! ```no_run
//! use beatgrid::Sequence;
//!
//! let sequence = Sequence::load("song.mid")?;
//! for line in sequence.summary().to_lines() {
//!     println!("{}", line);
//! }
//! # Ok::<(), beatgrid::GridError>(())
//! ```

use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::debug;

use crate::error::GridError;

pub const DEFAULT_BPM: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
}

/// A note message at an absolute tick position. Velocity is kept raw, so a note on with
/// velocity 0 is still [`EventKind::NoteOn`] here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: u8,
    pub velocity: u8,
    pub tick: u64,
    pub kind: EventKind,
}

impl NoteEvent {
    pub fn is_note_start(&self) -> bool {
        self.kind == EventKind::NoteOn && self.velocity > 0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Track {
    /// Empty when the track has no name meta event
    pub name: String,
    pub events: Vec<NoteEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub ticks_per_quarter: u16,
    pub bpm: f64,
    pub tracks: Vec<Track>,
}

impl Sequence {
    /// Read and decode a MIDI file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Decode a MIDI file already in memory.
    ///
    /// # Errors
    /// - [`GridError::MidiError`] if the bytes are not a valid SMF
    /// - [`GridError::UnsupportedTiming`] for timecode files or a zero resolution
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GridError> {
        let smf = Smf::parse(bytes).map_err(|e| GridError::MidiError(e.to_string()))?;

        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) if tpq.as_int() > 0 => tpq.as_int(),
            Timing::Metrical(_) => {
                return Err(GridError::UnsupportedTiming(
                    "resolution of 0 ticks per quarter note".to_string(),
                ))
            }
            Timing::Timecode(fps, subframes) => {
                return Err(GridError::UnsupportedTiming(format!(
                    "timecode timing ({} fps, {} subframes) has no beat grid",
                    fps.as_f32(),
                    subframes
                )))
            }
        };

        let mut bpm = None;
        let mut tracks = Vec::with_capacity(smf.tracks.len());

        for raw in &smf.tracks {
            let mut track = Track::default();
            let mut named = false;
            let mut tick: u64 = 0;

            for event in raw {
                tick += u64::from(event.delta.as_int());
                match event.kind {
                    TrackEventKind::Midi { message, .. } => {
                        let (kind, key, vel) = match message {
                            MidiMessage::NoteOn { key, vel } => (EventKind::NoteOn, key, vel),
                            MidiMessage::NoteOff { key, vel } => (EventKind::NoteOff, key, vel),
                            _ => continue,
                        };
                        track.events.push(NoteEvent {
                            note: key.as_int(),
                            velocity: vel.as_int(),
                            tick,
                            kind,
                        });
                    }
                    TrackEventKind::Meta(MetaMessage::TrackName(name)) if !named => {
                        track.name = String::from_utf8_lossy(name).into_owned();
                        named = true;
                    }
                    TrackEventKind::Meta(MetaMessage::Tempo(tempo)) if bpm.is_none() => {
                        let micros = tempo.as_int();
                        if micros > 0 {
                            bpm = Some(60_000_000.0 / f64::from(micros));
                        }
                    }
                    _ => {}
                }
            }

            debug!(
                name = %track.name,
                events = track.events.len(),
                "decoded track"
            );
            tracks.push(track);
        }

        Ok(Self {
            ticks_per_quarter,
            bpm: bpm.unwrap_or(DEFAULT_BPM),
            tracks,
        })
    }

    pub fn ticks_per_sixteenth(&self) -> f64 {
        f64::from(self.ticks_per_quarter) / 4.0
    }

    pub fn ticks_per_measure(&self) -> f64 {
        f64::from(self.ticks_per_quarter) * 4.0
    }

    /// Per-track note statistics, to help write track-name keywords in the configuration.
    pub fn summary(&self) -> SequenceSummary {
        let tracks = self
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let starts = track.events.iter().filter(|e| e.is_note_start());
                let mut note_count = 0;
                let mut range: Option<(u8, u8)> = None;
                for event in starts {
                    note_count += 1;
                    range = Some(match range {
                        None => (event.note, event.note),
                        Some((lo, hi)) => (lo.min(event.note), hi.max(event.note)),
                    });
                }
                TrackSummary {
                    index,
                    name: track.name.clone(),
                    note_count,
                    range,
                }
            })
            .collect();

        SequenceSummary {
            ticks_per_quarter: self.ticks_per_quarter,
            bpm: self.bpm,
            tracks,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub index: usize,
    pub name: String,
    pub note_count: usize,
    /// Lowest and highest note started in the track
    pub range: Option<(u8, u8)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSummary {
    pub ticks_per_quarter: u16,
    pub bpm: f64,
    pub tracks: Vec<TrackSummary>,
}

impl SequenceSummary {
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Resolution: {} PPQ", self.ticks_per_quarter),
            format!("BPM: {:.2}", self.bpm),
        ];
        for track in &self.tracks {
            let name = if track.name.is_empty() {
                "<unnamed>"
            } else {
                track.name.as_str()
            };
            match track.range {
                Some((lo, hi)) => lines.push(format!(
                    "[{}] '{}': {} notes (Range: {}-{})",
                    track.index, name, track.note_count, lo, hi
                )),
                None => lines.push(format!("[{}] '{}': (empty or meta only)", track.index, name)),
            }
        }
        lines
    }
}
