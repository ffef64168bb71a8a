//! # Configuration
//!
//! Loads the converter configuration from YAML (or JSON, which YAML accepts) and resolves
//! every optional field once, so the conversion core only sees complete [`RoutingRule`]s
//! and [`PlayerSpec`]s.
//!
//! ## Format
//! ```yaml
//! input_file: song.mid
//! output_file: song.beat        # default: output_beats.txt
//! scan_only: false
//! players:
//!   - index: 0
//!     name: Guitar Boss         # default: "Player <index + 1>"
//!     role: Guitar              # default: "Guitar"
//!     min_velocity: 20          # integer, or false for no floor
//!     timeline:
//!       - track_name_contains: guitar
//!         start_measure: 1      # default: 0
//!         end_measure: 33       # default: 99999
//!         mapping: { low: C4, high: G5 }
//! mappings:                     # legacy flat rules, applied before player timelines
//!   - track_name_contains: drums
//!     player_index: 1
//!     mapping: { low: 40, high: 50 }
//! ```
//!
//! Relative `input_file` and `output_file` paths are looked up next to the configuration
//! file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::GridError;
use crate::pitch::Threshold;
use crate::rules::{BandThresholds, RoutingRule, DEFAULT_END_MEASURE, DEFAULT_START_MEASURE};

pub const DEFAULT_OUTPUT_FILE: &str = "output_beats.txt";
pub const DEFAULT_ROLE: &str = "Guitar";

/// A player declared in the chart header.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSpec {
    pub index: usize,
    pub name: String,
    pub role: String,
}

impl PlayerSpec {
    /// Identifier written in the chart, e.g. `player1` for index 0.
    pub fn id(&self) -> String {
        format!("player{}", self.index + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub scan_only: bool,
    pub players: Vec<PlayerSpec>,
    /// Legacy rules first, then each player's timeline in declaration order
    pub rules: Vec<RoutingRule>,
    /// Directory relative paths are resolved against
    pub base_dir: PathBuf,
}

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
struct RawConfig {
    input_file: Option<String>,
    output_file: Option<String>,
    #[serde(default)]
    scan_only: bool,
    #[serde(default)]
    players: Vec<RawPlayer>,
    #[serde(default)]
    mappings: Vec<RawRule>,
}

#[derive(Deserialize, Debug)]
struct RawPlayer {
    index: usize,
    name: Option<String>,
    role: Option<String>,
    min_velocity: Option<VelocityFloor>,
    #[serde(default)]
    timeline: Vec<RawRule>,
}

#[derive(Deserialize, Debug)]
struct RawRule {
    #[serde(default)]
    track_name_contains: String,
    start_measure: Option<i64>,
    end_measure: Option<i64>,
    min_velocity: Option<VelocityFloor>,
    player_index: Option<usize>,
    mapping: Option<RawMapping>,
}

#[derive(Deserialize, Debug)]
struct RawMapping {
    low: Option<Threshold>,
    high: Option<Threshold>,
}

/// `min_velocity` accepts a number or a boolean (`false` = 0, `true` = 1).
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(untagged)]
enum VelocityFloor {
    Flag(bool),
    Value(u8),
}

impl VelocityFloor {
    fn value(self) -> u8 {
        match self {
            VelocityFloor::Flag(flag) => u8::from(flag),
            VelocityFloor::Value(v) => v,
        }
    }
}

impl Config {
    /// Load a configuration file. Relative paths inside it resolve against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_yaml(&contents, base_dir)
    }

    /// Parse a configuration from a YAML or JSON string.
    pub fn from_yaml(contents: &str, base_dir: impl Into<PathBuf>) -> Result<Self, GridError> {
        let raw: RawConfig =
            serde_yaml::from_str(contents).map_err(|e| GridError::ConfigError(e.to_string()))?;

        let input_file = raw
            .input_file
            .ok_or_else(|| GridError::ConfigError("missing 'input_file'".to_string()))?;
        let output_file = raw
            .output_file
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());

        let mut rules = Vec::new();
        for rule in raw.mappings {
            let player_index = rule.player_index.unwrap_or(0);
            let min_velocity = rule.min_velocity.map_or(0, VelocityFloor::value);
            rules.push(resolve_rule(rule, player_index, min_velocity));
        }

        let mut players = Vec::with_capacity(raw.players.len());
        for player in raw.players {
            let player_floor = player.min_velocity.map_or(0, VelocityFloor::value);
            for rule in player.timeline {
                let min_velocity = rule.min_velocity.map_or(player_floor, VelocityFloor::value);
                rules.push(resolve_rule(rule, player.index, min_velocity));
            }
            players.push(PlayerSpec {
                index: player.index,
                name: player
                    .name
                    .unwrap_or_else(|| format!("Player {}", player.index + 1)),
                role: player.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            });
        }

        Ok(Self {
            input_file: PathBuf::from(input_file),
            output_file: PathBuf::from(output_file),
            scan_only: raw.scan_only,
            players,
            rules,
            base_dir: base_dir.into(),
        })
    }

    /// Check that there is something to convert and that every threshold is a valid note.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.rules.is_empty() {
            return Err(GridError::ConfigError(
                "no rules found (neither 'mappings' nor 'players[].timeline')".to_string(),
            ));
        }
        for bands in self.rules.iter().filter_map(|rule| rule.bands.as_ref()) {
            bands.low.resolve()?;
            bands.high.resolve()?;
        }
        Ok(())
    }

    /// Locate the input file, trying the path as written and then next to the configuration.
    pub fn input_path(&self) -> Result<PathBuf, GridError> {
        if self.input_file.exists() {
            return Ok(self.input_file.clone());
        }
        let relative = self.base_dir.join(&self.input_file);
        if relative.exists() {
            return Ok(relative);
        }
        Err(GridError::ConfigError(format!(
            "input file not found: {:?} (also looked in {:?})",
            self.input_file, relative
        )))
    }

    pub fn output_path(&self) -> PathBuf {
        if self.output_file.is_absolute() {
            self.output_file.clone()
        } else {
            self.base_dir.join(&self.output_file)
        }
    }
}

fn resolve_rule(rule: RawRule, player_index: usize, min_velocity: u8) -> RoutingRule {
    let bands = match rule.mapping {
        Some(RawMapping {
            low: Some(low),
            high: Some(high),
        }) => Some(BandThresholds { low, high }),
        _ => {
            warn!(
                track = %rule.track_name_contains,
                player = player_index,
                "rule has no complete low/high mapping and will be ignored"
            );
            None
        }
    };

    RoutingRule {
        player_index,
        track_name_contains: rule.track_name_contains,
        start_measure: rule.start_measure.unwrap_or(DEFAULT_START_MEASURE),
        end_measure: rule.end_measure.unwrap_or(DEFAULT_END_MEASURE),
        min_velocity,
        bands,
    }
}
