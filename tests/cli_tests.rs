//! Command-line tests for the `beatgrid` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use midly::num::{u15, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

fn write_song(path: &Path) {
    let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(480))));
    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Guitar")),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(60),
                    vel: u7::new(100),
                },
            },
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);
    let mut bytes = Vec::new();
    smf.write(&mut bytes).unwrap();
    fs::write(path, bytes).unwrap();
}

fn run_with_config(config: &str, args: &[&str]) -> Output {
    let dir = tempfile::tempdir().unwrap();
    write_song(&dir.path().join("song.mid"));
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, config).unwrap();

    Command::new(env!("CARGO_BIN_EXE_beatgrid"))
        .args(args)
        .arg(&config_path)
        .env("RUST_LOG", "error")
        .output()
        .unwrap()
}

#[test]
fn test_scan_only_config_without_rules() {
    let output = run_with_config("input_file: song.mid\nscan_only: true\n", &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Resolution: 480 PPQ"));
    assert!(stdout.contains("[0] 'Guitar': 1 notes (Range: 60-60)"));
}

#[test]
fn test_scan_flag_ignores_bad_thresholds() {
    let config = r#"
input_file: song.mid
mappings:
  - track_name_contains: guitar
    mapping: { low: nope, high: C5 }
"#;
    let output = run_with_config(config, &["--scan"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Resolution: 480 PPQ"));
}

#[test]
fn test_convert_still_requires_rules() {
    let output = run_with_config("input_file: song.mid\n", &["--stdout"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no rules found"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_convert_to_stdout() {
    let config = r#"
input_file: song.mid
players:
  - index: 0
    timeline:
      - track_name_contains: guitar
        mapping: { low: C4, high: C4 }
"#;
    let output = run_with_config(config, &["--stdout"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Players 1\n-player1:Player 1:Guitar\nBeats 1\n"));
    assert!(stdout.contains("-0 0 0 0:H"));
}
