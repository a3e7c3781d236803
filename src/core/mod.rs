//! Core deterministic primitives.
//!
//! The PRNG and the seed hash must agree bit for bit with every other
//! client that shuffles the daily deck.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::DeterministicRng;
pub use hash::{hash_string_to_seed, short_hex_id};
