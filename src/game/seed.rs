//! Daily Seed
//!
//! Every player gets the same card order for a given deck and UTC day:
//! `seed = hash("{deck}|{YYYY-MM-DD}")`, then a Mulberry32-driven
//! Fisher-Yates shuffle. Dev overrides (`day=`, `seed=`) can pin either
//! input for testing and deep links.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Deserialize};

use crate::core::hash::hash_string_to_seed;
use crate::core::rng::DeterministicRng;
use crate::game::deck::{deck_by_id, Deck};

/// Day key format.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format a UTC timestamp as a day key.
pub fn day_key_for(now: DateTime<Utc>) -> String {
    now.format(DAY_KEY_FORMAT).to_string()
}

/// Today's UTC day key.
pub fn utc_day_key() -> String {
    day_key_for(Utc::now())
}

/// Is `s` a `YYYY-MM-DD` calendar date?
pub fn is_valid_day_key(s: &str) -> bool {
    let shaped = s.len() == 10
        && s.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    shaped && NaiveDate::parse_from_str(s, DAY_KEY_FORMAT).is_ok()
}

/// Seed for `deck_id` on `day_key`.
pub fn daily_seed(deck_id: &str, day_key: &str) -> u32 {
    hash_string_to_seed(&format!("{}|{}", deck_id, day_key))
}

/// Shuffled copy of `items`. Same seed, same permutation.
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: u32) -> Vec<T> {
    let mut result = items.to_vec();
    DeterministicRng::new(seed).shuffle(&mut result);
    result
}

// =============================================================================
// DEV OVERRIDES
// =============================================================================

/// Testing hooks for the daily seed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOverrides {
    /// Replaces today's day key
    pub day: Option<String>,
    /// Replaces the computed seed outright
    pub seed: Option<u32>,
}

impl DayOverrides {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse `day=YYYY-MM-DD&seed=N` from a query string.
    ///
    /// Invalid values are ignored. Seeds wrap to 32 bits, so negative
    /// numbers are accepted.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut overrides = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "day" if is_valid_day_key(&value) => {
                    overrides.day = Some(value.into_owned());
                }
                "seed" => {
                    if let Ok(n) = value.trim().parse::<i64>() {
                        overrides.seed = Some(n as u32);
                    }
                }
                _ => {}
            }
        }
        overrides
    }

    /// True if any override is set.
    pub fn is_active(&self) -> bool {
        self.day.is_some() || self.seed.is_some()
    }

    /// Short description for display, e.g. `"Dev: day=2024-01-15, seed=42"`.
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(day) = &self.day {
            parts.push(format!("day={}", day));
        }
        if let Some(seed) = self.seed {
            parts.push(format!("seed={}", seed));
        }
        if parts.is_empty() {
            None
        } else {
            Some(format!("Dev: {}", parts.join(", ")))
        }
    }

    /// Day key to use, given the real one.
    pub fn day_key(&self, today: &str) -> String {
        self.day.clone().unwrap_or_else(|| today.to_string())
    }

    /// Seed to use for `deck_id` on `day_key`.
    pub fn seed_for(&self, deck_id: &str, day_key: &str) -> u32 {
        self.seed.unwrap_or_else(|| daily_seed(deck_id, day_key))
    }
}

/// The deck for a day, with its cards in that day's order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyDeck {
    /// Deck with shuffled cards
    pub deck: Deck,
    /// Day key the order was derived from
    pub day_key: String,
    /// Seed actually used
    pub seed: u32,
}

/// Resolve and shuffle the deck for a day.
pub fn daily_deck(deck_id: &str, overrides: &DayOverrides, today: &str) -> DailyDeck {
    let mut deck = deck_by_id(deck_id);
    let day_key = overrides.day_key(today);
    // Seed from the resolved deck id so a fallback deck shuffles like itself
    let seed = overrides.seed_for(&deck.id, &day_key);
    deck.cards = seeded_shuffle(&deck.cards, seed);
    DailyDeck { deck, day_key, seed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TEN: [u32; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

    #[test]
    fn test_day_key_format() {
        let t = Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 59).unwrap();
        assert_eq!(day_key_for(t), "2024-01-05");
    }

    #[test]
    fn test_valid_day_keys() {
        assert!(is_valid_day_key("2024-01-15"));
        assert!(is_valid_day_key("2024-02-29"));
        assert!(!is_valid_day_key("2023-02-29"));
        assert!(!is_valid_day_key("2024-1-15"));
        assert!(!is_valid_day_key("2024/01/15"));
        assert!(!is_valid_day_key(""));
    }

    #[test]
    fn test_daily_seed_known_value() {
        assert_eq!(daily_seed("nfl-playoffs", "2024-01-15"), 78815534);
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let seed = daily_seed("nfl-playoffs", "2024-01-15");
        let a = seeded_shuffle(&TEN, seed);
        let b = seeded_shuffle(&TEN, seed);
        assert_eq!(a, b);
        assert_eq!(a, vec![3, 6, 9, 0, 1, 8, 7, 2, 5, 4]);
    }

    #[test]
    fn test_next_day_changes_permutation() {
        let today = seeded_shuffle(&TEN, daily_seed("nfl-playoffs", "2024-01-15"));
        let tomorrow = seeded_shuffle(&TEN, daily_seed("nfl-playoffs", "2024-01-16"));
        assert_ne!(today, tomorrow);
        assert_eq!(tomorrow, vec![1, 9, 2, 8, 6, 7, 4, 5, 0, 3]);
        assert_ne!(tomorrow, TEN.to_vec());
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut shuffled = seeded_shuffle(&TEN, 987654);
        shuffled.sort();
        assert_eq!(shuffled, TEN.to_vec());
    }

    #[test]
    fn test_overrides_from_query() {
        let o = DayOverrides::from_query("?day=2024-01-15&seed=42");
        assert_eq!(o.day.as_deref(), Some("2024-01-15"));
        assert_eq!(o.seed, Some(42));
        assert_eq!(o.describe().as_deref(), Some("Dev: day=2024-01-15, seed=42"));

        let o = DayOverrides::from_query("day=tomorrow&seed=abc&other=1");
        assert!(!o.is_active());
        assert_eq!(o.describe(), None);

        let o = DayOverrides::from_query("seed=-1");
        assert_eq!(o.seed, Some(u32::MAX));
    }

    #[test]
    fn test_daily_deck_uses_overrides() {
        let plain = daily_deck("nfl-playoffs", &DayOverrides::none(), "2024-01-15");
        assert_eq!(plain.day_key, "2024-01-15");
        assert_eq!(plain.seed, 78815534);

        let pinned = daily_deck(
            "nfl-playoffs",
            &DayOverrides { day: Some("2024-01-15".into()), seed: None },
            "2030-06-01",
        );
        assert_eq!(pinned.deck.cards, plain.deck.cards);

        let seeded = daily_deck(
            "nfl-playoffs",
            &DayOverrides { day: None, seed: Some(78815534) },
            "2030-06-01",
        );
        assert_eq!(seeded.deck.cards, plain.deck.cards);
        assert_eq!(seeded.day_key, "2030-06-01");
    }

    #[test]
    fn test_unknown_deck_shuffles_as_fallback() {
        let fallback = daily_deck("mystery", &DayOverrides::none(), "2024-01-15");
        let real = daily_deck("nfl-playoffs", &DayOverrides::none(), "2024-01-15");
        assert_eq!(fallback.deck.cards, real.deck.cards);
    }
}
