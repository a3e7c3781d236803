//! Play State Definitions
//!
//! All state a single run carries. Owned by the reducer in `tick.rs`;
//! nothing here reads the clock.

use serde::{Serialize, Deserialize};

use crate::game::deck::{Card, Deck};
use crate::game::scoring::ScoreState;
use crate::game::tiles::TileScheme;

// =============================================================================
// MODE & CONFIG
// =============================================================================

/// Run mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Fixed time budget; misses cost points but the run continues.
    #[default]
    #[serde(rename = "sprint")]
    Sprint,
    /// First miss ends the run.
    #[serde(rename = "sudden")]
    SuddenDeath,
}

impl Mode {
    /// Wire tag (`"sprint"` / `"sudden"`).
    pub fn tag(self) -> &'static str {
        match self {
            Mode::Sprint => "sprint",
            Mode::SuddenDeath => "sudden",
        }
    }

    /// Parse a wire tag. Anything but `"sudden"` is a sprint.
    pub fn from_tag(tag: &str) -> Mode {
        if tag == "sudden" {
            Mode::SuddenDeath
        } else {
            Mode::Sprint
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Sprint => "Sprint",
            Mode::SuddenDeath => "Sudden Death",
        }
    }
}

/// Which modes new runs may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModePolicy {
    /// Allow sudden death for new runs (otherwise pinned to sprint)
    pub allow_sudden_death: bool,
}

impl ModePolicy {
    /// Mode a new run actually uses.
    pub fn resolve(&self, requested: Mode) -> Mode {
        match requested {
            Mode::SuddenDeath if !self.allow_sudden_death => {
                tracing::info!("sudden death disabled, pinning run to sprint");
                Mode::Sprint
            }
            other => other,
        }
    }
}

/// Timing and rules for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayConfig {
    /// Run mode
    pub mode: Mode,
    /// Total run budget
    pub total_ms: u64,
    /// Per-card budget
    pub per_card_ms: u64,
    /// Clock sampling interval
    pub tick_ms: u64,
    /// Pause between an answer and the next card
    pub reveal_ms: u64,
    /// Tile scheme for the share grid
    pub tile_scheme: TileScheme,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self::for_mode(Mode::Sprint)
    }
}

impl PlayConfig {
    /// Standard config for a mode.
    ///
    /// Sudden death keeps the same overall cap as a sprint.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            total_ms: 60_000,
            per_card_ms: 6_000,
            tick_ms: 50,
            reveal_ms: 200,
            tile_scheme: TileScheme::Outcome,
        }
    }
}

// =============================================================================
// ANSWERS & STATS
// =============================================================================

/// One answered (or expired) card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvent {
    /// Answer was correct
    pub correct: bool,
    /// Time from card shown to answer
    pub response_ms: u64,
    /// Card clock ran out
    #[serde(default)]
    pub timeout: bool,
}

impl AnswerEvent {
    /// Event for a chosen answer.
    pub fn answered(correct: bool, response_ms: u64) -> Self {
        Self { correct, response_ms, timeout: false }
    }

    /// Event for an expired card.
    pub fn timed_out(per_card_ms: u64) -> Self {
        Self { correct: false, response_ms: per_card_ms, timeout: true }
    }

    /// Wrong or timed out.
    #[inline]
    pub fn is_miss(&self) -> bool {
        !self.correct || self.timeout
    }
}

/// Answer tallies. `answered == correct + wrong + timeout`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Correct answers
    pub correct: u32,
    /// Wrong answers
    pub wrong: u32,
    /// Expired cards
    pub timeout: u32,
    /// All of the above
    pub answered: u32,
    /// Rounded running mean of response times
    pub avg_response_ms: u64,
}

impl RunStats {
    /// Record one answer event.
    ///
    /// Timeouts count toward the mean at their full budget. The browser
    /// client left the mean untouched on a timeout; counting them keeps
    /// `avg_response_ms` a mean over every recorded event.
    pub fn record(&mut self, event: &AnswerEvent) {
        if event.timeout {
            self.timeout += 1;
        } else if event.correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }

        let n = self.answered as u64;
        let total = self.avg_response_ms * n + event.response_ms;
        // round half up, as the client does
        self.avg_response_ms = (2 * total + n + 1) / (2 * (n + 1));
        self.answered += 1;
    }

    /// Rounded accuracy percentage (0 when nothing was answered).
    pub fn accuracy_percent(&self) -> u32 {
        if self.answered == 0 {
            return 0;
        }
        ((self.correct as u64 * 200 + self.answered as u64) / (2 * self.answered as u64)) as u32
    }
}

// =============================================================================
// PHASE
// =============================================================================

/// Session phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for start
    #[default]
    Ready,
    /// A card is live and its clock is running
    Playing,
    /// Showing the result of the last answer
    Reveal,
    /// Run over
    Finished,
    /// Today's run was already played
    Locked,
}

/// Why a run ended. Diagnostic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Every card answered
    DeckComplete,
    /// Total clock ran out
    TimeUp,
    /// Wrong answer in sudden death
    SuddenDeathWrong,
    /// Timeout in sudden death
    SuddenDeathTimeout,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FinishReason::DeckComplete => "deck complete",
            FinishReason::TimeUp => "time up",
            FinishReason::SuddenDeathWrong => "wrong (sudden death)",
            FinishReason::SuddenDeathTimeout => "timeout (sudden death)",
        };
        f.write_str(s)
    }
}

// =============================================================================
// PLAY STATE
// =============================================================================

/// Complete state of one play session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayState {
    /// Deck in today's order
    pub deck: Deck,
    /// Day key the deck order belongs to
    pub day_key: String,
    /// Rules and timings
    pub config: PlayConfig,
    /// Current phase
    pub phase: Phase,
    /// Index of the current card
    pub index: usize,
    /// Running score
    pub score: ScoreState,
    /// Answer tallies
    pub stats: RunStats,
    /// Answers in arrival order
    pub answers: Vec<AnswerEvent>,
    /// Timestamp the run started
    pub run_started_at: u64,
    /// Timestamp the current card was shown
    pub card_started_at: u64,
    /// Total clock remaining as of the last tick
    pub remaining_ms: u64,
    /// Card clock remaining as of the last tick
    pub card_remaining_ms: u64,
    /// Today's run has been played (start is refused)
    pub played: bool,
    /// Last choice index, for highlighting during reveal
    pub last_choice: Option<usize>,
    /// Why the last run ended
    pub finish_reason: Option<FinishReason>,
    /// Session torn down; every further action is ignored
    pub torn_down: bool,
}

impl PlayState {
    /// Create a session for `deck` (already in daily order).
    ///
    /// `played` puts the session in `Locked` for its whole lifetime.
    pub fn new(deck: Deck, day_key: String, config: PlayConfig, played: bool) -> Self {
        Self {
            deck,
            day_key,
            config,
            phase: if played { Phase::Locked } else { Phase::Ready },
            index: 0,
            score: ScoreState::new(),
            stats: RunStats::default(),
            answers: Vec::new(),
            run_started_at: 0,
            card_started_at: 0,
            remaining_ms: config.total_ms,
            card_remaining_ms: config.per_card_ms,
            played,
            last_choice: None,
            finish_reason: None,
            torn_down: false,
        }
    }

    /// The live card, if any.
    pub fn current_card(&self) -> Option<&Card> {
        match self.phase {
            Phase::Playing | Phase::Reveal => self.deck.cards.get(self.index),
            _ => None,
        }
    }

    /// Are there cards after the current one?
    pub fn has_next_card(&self) -> bool {
        self.index + 1 < self.deck.len()
    }

    /// Is the run over (or never allowed to start)?
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Locked)
    }

    /// Reset per-run fields for a new run starting at `now_ms`.
    pub fn reset_run(&mut self, now_ms: u64) {
        self.index = 0;
        self.score = ScoreState::new();
        self.stats = RunStats::default();
        self.answers.clear();
        self.run_started_at = now_ms;
        self.card_started_at = now_ms;
        self.remaining_ms = self.config.total_ms;
        self.card_remaining_ms = self.config.per_card_ms;
        self.last_choice = None;
        self.finish_reason = None;
    }
}

// =============================================================================
// TESTS
// =============================================================================
