//! # Chart Output
//!
//! Renders a [`Grid`] into the BeatJam `.beat` text layout:
//!
//! ```text
//! Players 2
//! -player1:Guitar Boss:Guitar
//! -player2:Player 2:Bass
//! Beats 2
//! ; measure beat sixteenth player_index:notes,...
//! -0 1 0 0:H
//! -1 0 2 0:HL,1:M
//! ```
//!
//! Slots are written in ascending order, players within a slot in ascending index order,
//! and band letters in H, L, M order. Empty cells are never written.

use crate::config::PlayerSpec;
use crate::grid::{Grid, SlotPosition};
use crate::pitch::PitchBand;

pub const COLUMN_COMMENT: &str = "; measure beat sixteenth player_index:notes,...";

/// Render a fully aggregated grid. The grid is consumed; nothing is added after rendering.
pub fn render(grid: Grid, players: &[PlayerSpec]) -> Vec<String> {
    let mut lines = Vec::with_capacity(players.len() + 2);

    lines.push(format!("Players {}", players.len()));
    for player in players {
        lines.push(format!("-{}:{}:{}", player.id(), player.name, player.role));
    }

    let mut beats = Vec::new();
    for (slot, cells) in grid.slots() {
        let parts: Vec<String> = cells
            .iter()
            .filter_map(|(player, bands)| {
                let letters: String = PitchBand::RENDER_ORDER
                    .iter()
                    .filter(|band| bands.contains(*band))
                    .map(|band| band.letter())
                    .collect();
                (!letters.is_empty()).then(|| format!("{}:{}", player, letters))
            })
            .collect();

        if parts.is_empty() {
            continue;
        }

        let pos = SlotPosition::from_slot(slot);
        beats.push(format!(
            "-{} {} {} {}",
            pos.measure,
            pos.beat,
            pos.sixteenth,
            parts.join(",")
        ));
    }

    lines.push(format!("Beats {}", beats.len()));
    lines.push(COLUMN_COMMENT.to_string());
    lines.extend(beats);
    lines
}
