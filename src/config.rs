//! Runtime configuration for the binary, read from the environment.

use std::path::PathBuf;

use thiserror::Error;

use crate::game::deck::DEFAULT_DECK_ID;
use crate::game::seed::DayOverrides;
use crate::game::state::{Mode, ModePolicy};

/// Default demo bot accuracy, percent.
pub const DEFAULT_BOT_ACCURACY: u32 = 80;

/// Invalid environment values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `RECALL_MODE` is neither `sprint` nor `sudden`.
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// `RECALL_BOT_ACCURACY` is not a percentage.
    #[error("Invalid bot accuracy: {0}")]
    InvalidAccuracy(String),
}

/// Settings for one run of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deck to play
    pub deck_id: String,
    /// Requested mode
    pub mode: Mode,
    /// Mode policy
    pub policy: ModePolicy,
    /// Dev overrides
    pub overrides: DayOverrides,
    /// JSON store path; in-memory when absent
    pub store_path: Option<PathBuf>,
    /// Token to decode and show instead of playing
    pub share_token: Option<String>,
    /// Demo bot accuracy, percent
    pub bot_accuracy: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            deck_id: DEFAULT_DECK_ID.to_string(),
            mode: Mode::Sprint,
            policy: ModePolicy::default(),
            overrides: DayOverrides::none(),
            store_path: None,
            share_token: None,
            bot_accuracy: DEFAULT_BOT_ACCURACY,
        }
    }
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mode = match var("RECALL_MODE").as_deref() {
            None | Some("sprint") => Mode::Sprint,
            Some("sudden") => Mode::SuddenDeath,
            Some(other) => return Err(ConfigError::UnknownMode(other.to_string())),
        };

        let bot_accuracy = match var("RECALL_BOT_ACCURACY") {
            None => DEFAULT_BOT_ACCURACY,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n <= 100 => n,
                _ => return Err(ConfigError::InvalidAccuracy(raw)),
            },
        };

        Ok(Self {
            deck_id: var("RECALL_DECK").unwrap_or_else(|| DEFAULT_DECK_ID.to_string()),
            mode,
            policy: ModePolicy {
                allow_sudden_death: var("RECALL_ALLOW_SUDDEN")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            },
            overrides: var("RECALL_QUERY")
                .map(|q| DayOverrides::from_query(&q))
                .unwrap_or_default(),
            store_path: var("RECALL_STORE_PATH").map(PathBuf::from),
            share_token: var("RECALL_SHARE_TOKEN"),
            bot_accuracy,
        })
    }
}
