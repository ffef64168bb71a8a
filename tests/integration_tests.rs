//! Integration tests for the beat grid converter
//!
//! Tests the full pipeline from a MIDI file and configuration on disk to chart text.

use std::fs;
use std::path::Path;

use beatgrid::{convert_file, Config, Conversion, GridError, Sequence};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}

fn note(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        },
    }
}

/// Two tracks at 480 PPQ: "Guitar Lead" and "Bass".
fn write_song(path: &Path) {
    let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(480))));
    smf.tracks.push(vec![
        meta(0, MetaMessage::Tempo(u24::new(400_000))),
        meta(0, MetaMessage::EndOfTrack),
    ]);
    smf.tracks.push(vec![
        meta(0, MetaMessage::TrackName(b"Guitar Lead")),
        note(480, 60, 100),
        note(240, 60, 0),
        note(1200, 72, 80),
        meta(0, MetaMessage::EndOfTrack),
    ]);
    smf.tracks.push(vec![
        meta(0, MetaMessage::TrackName(b"Bass")),
        note(0, 28, 100),
        note(1920, 28, 10),
        meta(0, MetaMessage::EndOfTrack),
    ]);

    let mut bytes = Vec::new();
    smf.write(&mut bytes).unwrap();
    fs::write(path, bytes).unwrap();
}

const CONFIG: &str = r#"
input_file: song.mid
output_file: song.beat
players:
  - index: 0
    name: Guitar Boss
    timeline:
      - track_name_contains: guitar
        start_measure: 1
        end_measure: 99999
        mapping: { low: C4, high: C4 }
  - index: 1
    role: Bass
    min_velocity: 50
    timeline:
      - track_name_contains: bass
        mapping: { low: F2, high: E3 }
"#;

#[test]
fn test_convert_song_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_song(&dir.path().join("song.mid"));
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, CONFIG).unwrap();

    let config = Config::load(&config_path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.output_path(), dir.path().join("song.beat"));

    let chart = match convert_file(&config).unwrap() {
        Conversion::Generated(chart) => chart,
        Conversion::NothingGenerated => panic!("expected a chart"),
    };

    // Guitar: C5 at tick 480 (slot 4), C6 at tick 1920 (slot 16), both above C4.
    // Bass: E2 (28) at tick 0 is below F2, so Low; the quiet note at tick 1920 is below the floor.
    assert_eq!(
        chart.to_text(),
        "Players 2\n\
         -player1:Guitar Boss:Guitar\n\
         -player2:Player 2:Bass\n\
         Beats 3\n\
         ; measure beat sixteenth player_index:notes,...\n\
         -0 0 0 1:L\n\
         -0 1 0 0:H\n\
         -1 0 0 0:H"
    );
}

#[test]
fn test_scan_summary_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let midi_path = dir.path().join("song.mid");
    write_song(&midi_path);

    let sequence = Sequence::load(&midi_path).unwrap();
    assert!((sequence.bpm - 150.0).abs() < 1e-9);

    let lines = sequence.summary().to_lines();
    assert_eq!(lines[0], "Resolution: 480 PPQ");
    assert_eq!(lines[1], "BPM: 150.00");
    assert_eq!(lines[2], "[0] '<unnamed>': (empty or meta only)");
    assert_eq!(lines[3], "[1] 'Guitar Lead': 2 notes (Range: 60-72)");
    assert_eq!(lines[4], "[2] 'Bass': 2 notes (Range: 28-28)");
}

#[test]
fn test_nothing_generated_when_no_track_matches() {
    let dir = tempfile::tempdir().unwrap();
    write_song(&dir.path().join("song.mid"));
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
input_file: song.mid
players:
  - index: 0
    timeline:
      - track_name_contains: drums
        mapping: { low: C4, high: C5 }
"#,
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    assert_eq!(convert_file(&config).unwrap(), Conversion::NothingGenerated);
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, CONFIG).unwrap();

    let config = Config::load(&config_path).unwrap();
    assert!(matches!(
        convert_file(&config),
        Err(GridError::ConfigError(_))
    ));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("nope.yaml"));
    assert!(matches!(result, Err(GridError::Io { .. })));
}
