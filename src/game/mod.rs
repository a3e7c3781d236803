//! Game Logic Module
//!
//! Rules and the session reducer. 100% deterministic: no clocks, no I/O.
//!
//! ## Module Structure
//!
//! - `deck`: Cards, answer modes, deck registry
//! - `seed`: Daily seed, seeded shuffle, dev overrides
//! - `scoring`: Score transitions and bonus windows
//! - `tiles`: Outcome tiles and the share grid
//! - `state`: Play state, config, run stats
//! - `input`: Reducer actions
//! - `events`: Session events and timer commands
//! - `tick`: The reducer
//! - `summary`: Finished-run summary

pub mod deck;
pub mod seed;
pub mod scoring;
pub mod tiles;
pub mod state;
pub mod input;
pub mod events;
pub mod tick;
pub mod summary;

// Re-export key types
pub use deck::{AnswerMode, Card, Deck, PlayerAnswer};
pub use seed::{daily_deck, daily_seed, seeded_shuffle, DailyDeck, DayOverrides};
pub use scoring::{apply_score_event, ScoreEvent, ScoreState};
pub use tiles::{build_share_grid, tile_for_event, Tile, TilePolicy, TileScheme};
pub use state::{AnswerEvent, FinishReason, Mode, ModePolicy, Phase, PlayConfig, PlayState, RunStats};
pub use input::Action;
pub use events::{SessionEvent, StepResult, TimerCommand};
pub use tick::{reduce, step};
pub use summary::RunSummary;
