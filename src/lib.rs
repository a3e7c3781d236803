//! # Daily Recall
//!
//! Daily trivia play sessions: one shared card order per deck and UTC day,
//! a timed run with streak bonuses, and a compact shareable result token.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DAILY RECALL                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Mulberry32 PRNG                           │
//! │  └── hash.rs     - Seed hash, SHA-256 ids                    │
//! │                                                              │
//! │  game/           - Rules and reducer (deterministic)         │
//! │  ├── deck.rs     - Cards, answer modes, deck registry        │
//! │  ├── seed.rs     - Daily seed and shuffle                    │
//! │  ├── scoring.rs  - Score transitions, bonus windows          │
//! │  ├── tiles.rs    - Outcome tiles, share grid                 │
//! │  ├── state.rs    - Play state and run stats                  │
//! │  ├── tick.rs     - Session reducer                           │
//! │  └── summary.rs  - Finished-run summary                      │
//! │                                                              │
//! │  share/          - Wire formats                              │
//! │  ├── token.rs    - Run token codec                           │
//! │  └── link.rs     - Short links                               │
//! │                                                              │
//! │  session/        - Runtime (non-deterministic)               │
//! │  ├── store.rs    - Key-value persistence                     │
//! │  ├── play.rs     - Play session                              │
//! │  └── driver.rs   - tokio scheduler                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules never read a clock or touch storage:
//! - Card order depends only on deck id and day key
//! - The reducer only sees timestamps carried by its actions
//! - Timers are requested as `TimerCommand`s, never started directly
//!
//! Replaying the same actions from the same state gives the same run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod share;
pub mod session;
pub mod config;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use game::state::{Mode, Phase, PlayConfig, PlayState};
pub use game::summary::RunSummary;
pub use game::tiles::Tile;
pub use share::token::{decode, encode, DecodeError};
pub use session::play::{PlaySession, SessionSetup};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product name shown in previews
pub const PRODUCT_NAME: &str = "Recall Rush";
