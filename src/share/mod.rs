//! Share Module
//!
//! Wire formats for sharing a finished run.
//!
//! - `token`: Run token encoder and multi-generation decoder
//! - `link`: Short links for tokens

pub mod token;
pub mod link;

pub use token::{decode, decode_or_none, decode_token, encode, DecodeError, DecodedRun, TokenFormat};
pub use link::ShortLinks;
