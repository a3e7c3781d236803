//! Run Summary
//!
//! The shareable result of a finished run. Built once when the run
//! finishes and never mutated afterwards; `share::token` serializes it.

use serde::{Serialize, Deserialize};

use crate::game::deck::{deck_label, DEFAULT_DECK_ID};
use crate::game::scoring::max_score;
use crate::game::state::{Mode, PlayState};
use crate::game::tiles::{emoji_grid, Tile, TilePolicy, DEFAULT_ROW_WIDTH};
use crate::PRODUCT_NAME;

/// Max score assumed when a token does not carry one (25-card deck).
pub const DEFAULT_MAX_SCORE: i64 = 450;

/// Summary of one finished run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Final score
    pub score: i64,
    /// Rounded accuracy, 0-100
    pub accuracy_percent: u32,
    /// Longest streak
    pub best_streak: u32,
    /// Rounded mean response time
    pub avg_response_ms: u64,
    /// Mode the run was played in
    pub mode: Mode,
    /// Deck id
    pub deck_id: String,
    /// One tile per answered card, in answer order
    pub tiles: Vec<Tile>,
    /// Best possible score for the deck
    pub max_score: i64,
    /// Deck display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_label: Option<String>,
    /// Day the run was played
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_key: Option<String>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            score: 0,
            accuracy_percent: 0,
            best_streak: 0,
            avg_response_ms: 0,
            mode: Mode::Sprint,
            deck_id: DEFAULT_DECK_ID.to_string(),
            tiles: Vec::new(),
            max_score: DEFAULT_MAX_SCORE,
            deck_label: None,
            day_key: None,
        }
    }
}

impl RunSummary {
    /// Summarize the run held in `state`.
    ///
    /// Never produces values a token decoder would rewrite: an empty deck
    /// reports the default max score and blank labels are left out.
    pub fn from_state(state: &PlayState, policy: &impl TilePolicy) -> Self {
        Self {
            score: state.score.score,
            accuracy_percent: state.stats.accuracy_percent(),
            best_streak: state.score.best_streak,
            avg_response_ms: state.stats.avg_response_ms,
            mode: state.config.mode,
            deck_id: state.deck.id.clone(),
            tiles: policy.tiles_for(&state.answers, state.config.per_card_ms),
            max_score: match max_score(state.deck.len(), state.config.per_card_ms) {
                0 => DEFAULT_MAX_SCORE,
                n => n,
            },
            deck_label: Some(state.deck.label.clone()).filter(|l| !l.is_empty()),
            day_key: Some(state.day_key.clone()).filter(|d| !d.is_empty()),
        }
    }

    /// Label to show: the carried label, else one derived from the deck id.
    pub fn display_label(&self) -> String {
        self.deck_label
            .clone()
            .unwrap_or_else(|| deck_label(&self.deck_id))
    }

    /// Preview title, e.g. `"Recall Rush — Sprint • NFL Playoffs • 2024-01-15"`.
    pub fn title(&self) -> String {
        let mut title = format!("{} — {} • {}", PRODUCT_NAME, self.mode.label(), self.display_label());
        if let Some(day) = &self.day_key {
            title.push_str(" • ");
            title.push_str(day);
        }
        title
    }

    /// Preview description, e.g. `"120/450 • 80% accuracy • Best streak: 7"`.
    pub fn headline(&self) -> String {
        format!(
            "{}/{} • {}% accuracy • Best streak: {}",
            self.score, self.max_score, self.accuracy_percent, self.best_streak
        )
    }

    /// Plain-text share block: title, headline, emoji grid.
    pub fn share_text(&self) -> String {
        let grid = emoji_grid(&self.tiles, DEFAULT_ROW_WIDTH);
        if grid.is_empty() {
            format!("{}\n{}", self.title(), self.headline())
        } else {
            format!("{}\n{}\n{}", self.title(), self.headline(), grid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::deck::{deck_by_id, Deck};
    use crate::game::scoring::{apply_score_event, ScoreEvent};
    use crate::game::state::{AnswerEvent, PlayConfig};
    use crate::game::tiles::TileScheme;
    use crate::share::token::{decode, encode};

    #[test]
    fn test_from_state() {
        let config = PlayConfig::default();
        let mut state = PlayState::new(deck_by_id("nfl-playoffs"), "2024-01-15".into(), config, false);
        let events = [
            AnswerEvent::answered(true, 1000),
            AnswerEvent::answered(false, 2000),
            AnswerEvent::timed_out(6000),
        ];
        for e in &events {
            state.stats.record(e);
            state.answers.push(*e);
        }
        state.score = apply_score_event(state.score, ScoreEvent::Correct { response_ms: 1000, per_card_ms: 6000 });

        let summary = RunSummary::from_state(&state, &TileScheme::Outcome);
        assert_eq!(summary.score, 10);
        assert_eq!(summary.accuracy_percent, 33);
        assert_eq!(summary.best_streak, 1);
        assert_eq!(summary.avg_response_ms, 3000);
        assert_eq!(summary.tiles, vec![Tile::Green, Tile::Red, Tile::Gray]);
        assert_eq!(summary.max_score, 450);
        assert_eq!(summary.deck_label.as_deref(), Some("NFL Playoffs"));
        assert_eq!(summary.day_key.as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_empty_deck_summary_survives_token() {
        let deck = Deck { id: "custom-deck".into(), label: String::new(), cards: Vec::new() };
        let state = PlayState::new(deck, "2024-01-15".into(), PlayConfig::default(), false);

        let summary = RunSummary::from_state(&state, &TileScheme::Outcome);
        assert_eq!(summary.max_score, DEFAULT_MAX_SCORE);
        assert_eq!(summary.deck_label, None);
        assert_eq!(decode(&encode(&summary)).unwrap(), summary);
    }

    #[test]
    fn test_preview_text() {
        let summary = RunSummary {
            score: 120,
            accuracy_percent: 80,
            best_streak: 7,
            day_key: Some("2024-01-15".into()),
            ..RunSummary::default()
        };
        assert_eq!(summary.title(), "Recall Rush — Sprint • NFL Playoffs • 2024-01-15");
        assert_eq!(summary.headline(), "120/450 • 80% accuracy • Best streak: 7");
        assert_eq!(summary.share_text().lines().count(), 2);
    }
}
