//! Outcome Tiles
//!
//! Wordle-style share grid. One tile per answered card, in answer order.
//!
//! Two tile schemes exist:
//! - `Outcome` (canonical): green = correct, red = wrong, gray = timeout
//! - `Latency`: green = correct and fast, yellow = correct but slow, red = miss
//!
//! The scheme is a `TilePolicy`, so neither the reducer nor the token
//! codec cares which one produced the tiles.

use serde::{Serialize, Deserialize};

use crate::game::scoring::slow_threshold_ms;
use crate::game::state::AnswerEvent;

/// Default share grid row width (desktop).
pub const DEFAULT_ROW_WIDTH: usize = 10;

/// One cell of the share grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Correct (fast, in the latency scheme)
    #[serde(rename = "G")]
    Green,
    /// Correct but slow (latency scheme only)
    #[serde(rename = "Y")]
    Yellow,
    /// Wrong (or any miss, in the latency scheme)
    #[serde(rename = "R")]
    Red,
    /// Timed out
    #[serde(rename = "T")]
    Gray,
}

impl Tile {
    /// Canonical one-letter code used in share tokens.
    pub fn code(self) -> &'static str {
        match self {
            Tile::Green => "G",
            Tile::Yellow => "Y",
            Tile::Red => "R",
            Tile::Gray => "T",
        }
    }

    /// Emoji glyph.
    pub fn emoji(self) -> &'static str {
        match self {
            Tile::Green => "🟩",
            Tile::Yellow => "🟨",
            Tile::Red => "🟥",
            Tile::Gray => "⬜",
        }
    }

    /// Parse a tile from its code or any legacy alias.
    ///
    /// | Tile   | Accepted                      |
    /// |--------|-------------------------------|
    /// | Green  | `G`, `green`, 🟩              |
    /// | Yellow | `Y`, `yellow`, 🟨             |
    /// | Red    | `R`, `red`, 🟥                |
    /// | Gray   | `T`, `gray`, `grey`, ⬜       |
    pub fn from_alias(s: &str) -> Option<Tile> {
        let trimmed = s.trim();
        match trimmed {
            "🟩" => return Some(Tile::Green),
            "🟨" => return Some(Tile::Yellow),
            "🟥" => return Some(Tile::Red),
            "⬜" => return Some(Tile::Gray),
            _ => {}
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "g" | "green" => Some(Tile::Green),
            "y" | "yellow" => Some(Tile::Yellow),
            "r" | "red" => Some(Tile::Red),
            "t" | "gray" | "grey" => Some(Tile::Gray),
            _ => None,
        }
    }
}

/// Parse a compact tile pattern such as `"GGRT"` or `"🟩🟥⬜"`.
///
/// Unknown characters are skipped.
pub fn parse_pattern(pattern: &str) -> Vec<Tile> {
    pattern
        .chars()
        .filter_map(|c| {
            let mut buf = [0u8; 4];
            Tile::from_alias(c.encode_utf8(&mut buf))
        })
        .collect()
}

// =============================================================================
// TILE POLICIES
// =============================================================================

/// Maps one answer to one tile.
pub trait TilePolicy {
    /// Tile for `event` on a card with `per_card_ms` budget.
    fn tile_for(&self, event: &AnswerEvent, per_card_ms: u64) -> Tile;

    /// Tiles for a whole run, in answer order.
    fn tiles_for(&self, events: &[AnswerEvent], per_card_ms: u64) -> Vec<Tile> {
        events.iter().map(|e| self.tile_for(e, per_card_ms)).collect()
    }
}

/// Which tile scheme a run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileScheme {
    /// Green / red / gray by outcome
    #[default]
    Outcome,
    /// Green / yellow / red by outcome and latency
    Latency,
}

impl TilePolicy for TileScheme {
    fn tile_for(&self, event: &AnswerEvent, per_card_ms: u64) -> Tile {
        match self {
            TileScheme::Outcome => tile_for_event(event),
            TileScheme::Latency => {
                if event.correct && !event.timeout {
                    if event.response_ms <= slow_threshold_ms(per_card_ms) {
                        Tile::Green
                    } else {
                        Tile::Yellow
                    }
                } else {
                    Tile::Red
                }
            }
        }
    }
}

/// Canonical outcome tile: timeout -> gray, wrong -> red, correct -> green.
pub fn tile_for_event(event: &AnswerEvent) -> Tile {
    if event.timeout {
        Tile::Gray
    } else if !event.correct {
        Tile::Red
    } else {
        Tile::Green
    }
}

// =============================================================================
// GRID
// =============================================================================

/// Split tiles into rows of `row_width` (last row may be shorter).
///
/// A zero width is treated as one row holding everything.
pub fn build_share_grid(tiles: &[Tile], row_width: usize) -> Vec<Vec<Tile>> {
    if tiles.is_empty() {
        return Vec::new();
    }
    let width = if row_width == 0 { tiles.len() } else { row_width };
    tiles.chunks(width).map(<[Tile]>::to_vec).collect()
}

/// Tiles as one line of emoji.
pub fn tiles_to_emoji(tiles: &[Tile]) -> String {
    tiles.iter().map(|t| t.emoji()).collect()
}

/// Emoji grid, rows separated by newlines.
pub fn emoji_grid(tiles: &[Tile], row_width: usize) -> String {
    build_share_grid(tiles, row_width)
        .iter()
        .map(|row| tiles_to_emoji(row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tiles as their compact code string (`"GGRT"`).
pub fn tiles_to_codes(tiles: &[Tile]) -> String {
    tiles.iter().map(|t| t.code()).collect()
}
