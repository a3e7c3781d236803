//! Run Token Codec
//!
//! A run token is a finished-run summary packed into a URL-safe string.
//! Results pages, preview image renderers and the link shortener all
//! decode the same tokens independently, so they must agree on every
//! accepted shape and every default.
//!
//! ## Canonical Encoding
//!
//! ```text
//! base64url( JSON [score, accuracy, bestStreak, avgResponseMs, mode, deckId,
//!                  tiles, maxScore, deckLabel?, dayKey?] )
//! ```
//!
//! Output carries no padding. New optional fields only ever go on the end.
//!
//! ## Accepted Shapes
//!
//! | Shape          | Detected by           | Notes                                  |
//! |----------------|-----------------------|----------------------------------------|
//! | Array          | JSON array            | Canonical, positional                  |
//! | Compact object | object with key `s`   | `s,a,bs,ar,m,d,t,mx,dl,dk`             |
//! | Legacy object  | any other object      | long names; `runId,deckId,mode` required |
//!
//! Older generations percent-encoded the JSON before base64; the decoder
//! undoes that when the payload does not start with `{` or `[`.

use base64::{engine::general_purpose, Engine as _};
use percent_encoding::percent_decode_str;
use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::game::deck::DEFAULT_DECK_ID;
use crate::game::state::Mode;
use crate::game::summary::{RunSummary, DEFAULT_MAX_SCORE};
use crate::game::tiles::{parse_pattern, tiles_to_codes, Tile};

/// Why a token could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Base64 text length is 1 mod 4; no padding can fix it.
    #[error("Invalid token length: {0}")]
    InvalidLength(usize),

    /// Not base64.
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not UTF-8.
    #[error("Token payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Percent-decoded payload is not UTF-8.
    #[error("Token payload percent-decoding failed: {0}")]
    PercentDecoding(#[source] std::str::Utf8Error),

    /// Payload is not JSON.
    #[error("Invalid token JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A legacy token lacks a required string field.
    #[error("Token missing required field: {0}")]
    MissingField(&'static str),

    /// JSON that is neither an array nor an object.
    #[error("Unsupported token shape")]
    UnsupportedShape,
}

/// Which shape a token was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormat {
    /// Positional array
    Array,
    /// Short-key object
    CompactObject,
    /// Long-name object
    LegacyObject,
}

/// Extra fields only legacy tokens carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRunInfo {
    /// Client-generated run id
    pub run_id: String,
    /// Correct answers
    pub correct: u32,
    /// Answered cards
    pub answered: u32,
    /// Unix millis when the run finished
    pub timestamp: i64,
}

/// A decoded token with its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedRun {
    /// The run
    pub summary: RunSummary,
    /// Shape the token used
    pub format: TokenFormat,
    /// Legacy-only fields
    pub legacy: Option<LegacyRunInfo>,
}

// =============================================================================
// ENCODE
// =============================================================================

/// Encode a summary as a canonical token.
pub fn encode(summary: &RunSummary) -> String {
    let json = canonical_json(summary).to_string();
    general_purpose::URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// The canonical positional array for `summary`.
pub fn canonical_json(summary: &RunSummary) -> Value {
    let tiles: Vec<Value> = summary
        .tiles
        .iter()
        .map(|t| Value::from(t.code()))
        .collect();

    let mut fields = vec![
        Value::from(summary.score),
        Value::from(summary.accuracy_percent),
        Value::from(summary.best_streak),
        Value::from(summary.avg_response_ms),
        Value::from(summary.mode.tag()),
        Value::from(summary.deck_id.as_str()),
        Value::Array(tiles),
        Value::from(summary.max_score),
    ];

    // Optional tail; stop at the last present field so older decoders see
    // the shortest array they understand. Empty strings count as absent.
    let optional = [summary.deck_label.as_deref(), summary.day_key.as_deref()]
        .map(|v| v.filter(|s| !s.is_empty()));
    if let Some(last) = optional.iter().rposition(Option::is_some) {
        fields.extend(optional[..=last].iter().map(|v| match v {
            Some(s) => Value::from(*s),
            None => Value::Null,
        }));
    }

    Value::Array(fields)
}

/// Compact tile string for a summary, as older compact tokens carried it.
pub fn tile_pattern(summary: &RunSummary) -> String {
    tiles_to_codes(&summary.tiles)
}

// =============================================================================
// DECODE
// =============================================================================

/// Decode a token of any accepted shape.
pub fn decode(token: &str) -> Result<RunSummary, DecodeError> {
    decode_token(token).map(|run| run.summary)
}

/// Decode, treating any failure as "no shared run".
pub fn decode_or_none(token: &str) -> Option<RunSummary> {
    match decode(token) {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::warn!(error = %e, "discarding undecodable run token");
            None
        }
    }
}

/// Decode a token, keeping its format and any legacy fields.
pub fn decode_token(token: &str) -> Result<DecodedRun, DecodeError> {
    let payload = payload_text(token)?;
    let value: Value = serde_json::from_str(&payload)?;

    match value {
        Value::Array(items) => Ok(DecodedRun {
            summary: from_array(&items),
            format: TokenFormat::Array,
            legacy: None,
        }),
        Value::Object(map) if map.contains_key("s") => Ok(DecodedRun {
            summary: from_compact(&map),
            format: TokenFormat::CompactObject,
            legacy: None,
        }),
        Value::Object(map) => {
            let (summary, legacy) = from_legacy(&map)?;
            Ok(DecodedRun {
                summary,
                format: TokenFormat::LegacyObject,
                legacy: Some(legacy),
            })
        }
        _ => Err(DecodeError::UnsupportedShape),
    }
}

/// Base64 (either alphabet, padding optional) to JSON text.
fn payload_text(token: &str) -> Result<String, DecodeError> {
    let mut normalized: String = token
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    match normalized.len() % 4 {
        1 => return Err(DecodeError::InvalidLength(normalized.len())),
        2 => normalized.push_str("=="),
        3 => normalized.push('='),
        _ => {}
    }

    let bytes = general_purpose::STANDARD.decode(normalized.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    let trimmed = text.trim();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Ok(trimmed.to_string())
    } else {
        percent_decode_str(trimmed)
            .decode_utf8()
            .map(|s| s.into_owned())
            .map_err(DecodeError::PercentDecoding)
    }
}

fn from_array(items: &[Value]) -> RunSummary {
    let at = |i: usize| items.get(i);
    RunSummary {
        score: number_or_zero(at(0)),
        accuracy_percent: clamp_percent(number_or_zero(at(1))),
        best_streak: saturating_u32(number_or_zero(at(2))),
        avg_response_ms: non_negative(number_or_zero(at(3))),
        mode: mode_or_sprint(at(4)),
        deck_id: deck_or_default(at(5)),
        tiles: tiles_of(at(6)),
        max_score: max_score_or_default(at(7)),
        deck_label: optional_string(at(8)),
        day_key: optional_string(at(9)),
    }
}

fn from_compact(map: &Map<String, Value>) -> RunSummary {
    RunSummary {
        score: number_or_zero(map.get("s")),
        accuracy_percent: clamp_percent(number_or_zero(map.get("a"))),
        best_streak: saturating_u32(number_or_zero(map.get("bs"))),
        avg_response_ms: non_negative(number_or_zero(map.get("ar"))),
        mode: mode_or_sprint(map.get("m")),
        deck_id: deck_or_default(map.get("d")),
        tiles: tiles_of(map.get("t")),
        max_score: max_score_or_default(map.get("mx")),
        deck_label: optional_string(map.get("dl")),
        day_key: optional_string(map.get("dk")),
    }
}

fn from_legacy(map: &Map<String, Value>) -> Result<(RunSummary, LegacyRunInfo), DecodeError> {
    let run_id = required_string(map, "runId")?;
    required_string(map, "deckId")?;
    required_string(map, "mode")?;

    let summary = RunSummary {
        score: number_or_zero(map.get("score")),
        accuracy_percent: clamp_percent(number_or_zero(map.get("accuracy"))),
        best_streak: saturating_u32(number_or_zero(map.get("bestStreak"))),
        avg_response_ms: non_negative(number_or_zero(map.get("avgResponseMs"))),
        mode: mode_or_sprint(map.get("mode")),
        deck_id: deck_or_default(map.get("deckId")),
        tiles: tiles_of(map.get("tiles")),
        max_score: max_score_or_default(map.get("maxScore")),
        deck_label: optional_string(map.get("deckLabel")),
        day_key: optional_string(map.get("dayKey")),
    };
    let legacy = LegacyRunInfo {
        run_id: run_id.to_string(),
        correct: saturating_u32(number_or_zero(map.get("correct"))),
        answered: saturating_u32(number_or_zero(map.get("answered"))),
        timestamp: number_or_zero(map.get("timestamp")),
    };
    Ok((summary, legacy))
}

// =============================================================================
// FIELD COERCION
// =============================================================================

/// Numeric-or-zero: numbers as-is, numeric strings parsed, booleans 1/0,
/// everything else 0. Integers stay exact; out-of-range values saturate.
fn number_or_zero(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .unwrap_or_else(|| rounded(n.as_f64().unwrap_or(0.0))),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .unwrap_or_else(|_| rounded(s.parse::<f64>().unwrap_or(0.0)))
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

fn rounded(n: f64) -> i64 {
    if n.is_finite() {
        // float-to-int casts saturate
        n.round() as i64
    } else {
        0
    }
}

fn non_negative(n: i64) -> u64 {
    n.max(0) as u64
}

fn saturating_u32(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

fn clamp_percent(n: i64) -> u32 {
    n.clamp(0, 100) as u32
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    non_empty_str(value).map(str::to_string)
}

fn mode_or_sprint(value: Option<&Value>) -> Mode {
    non_empty_str(value).map(Mode::from_tag).unwrap_or(Mode::Sprint)
}

fn deck_or_default(value: Option<&Value>) -> String {
    non_empty_str(value).unwrap_or(DEFAULT_DECK_ID).to_string()
}

fn max_score_or_default(value: Option<&Value>) -> i64 {
    match number_or_zero(value) {
        0 => DEFAULT_MAX_SCORE,
        n => n,
    }
}

/// Tiles from an array of codes/aliases or a single pattern string.
fn tiles_of(value: Option<&Value>) -> Vec<Tile> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Tile::from_alias)
            .collect(),
        Some(Value::String(pattern)) => parse_pattern(pattern),
        _ => Vec::new(),
    }
}

fn required_string<'a>(map: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, DecodeError> {
    map.get(key)
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingField(key))
}

// =============================================================================
// TESTS
// =============================================================================
