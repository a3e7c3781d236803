//! Session Module
//!
//! Non-deterministic runtime around the reducer: storage, run ids,
//! wall-clock scheduling.
//!
//! ## Module Structure
//!
//! - `clock`: Monotonic session clock
//! - `store`: Key-value persistence capability
//! - `play`: Play session (lock check, persistence, dispatch)
//! - `driver`: tokio scheduler for a play session

pub mod clock;
pub mod store;
pub mod play;
pub mod driver;

pub use clock::SessionClock;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use play::{PlaySession, SessionSetup};
pub use driver::{drive, drive_with_events, PlayerCommand};
