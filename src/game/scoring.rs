//! Scoring Rules
//!
//! Pure score transitions. Points per outcome:
//! - Correct: 10 (fast) or 6 (slower than 80% of the card budget), times the bonus multiplier
//! - Wrong: -4
//! - Timeout: -6
//!
//! Every positive multiple of 5 in the streak opens a doubled-points
//! window for the next 5 correct answers.

use serde::{Serialize, Deserialize};

/// Points for a fast correct answer.
pub const FAST_POINTS: i64 = 10;

/// Points for a slow correct answer.
pub const SLOW_POINTS: i64 = 6;

/// Penalty for a wrong answer.
pub const WRONG_PENALTY: i64 = 4;

/// Penalty for letting the card clock run out.
pub const TIMEOUT_PENALTY: i64 = 6;

/// Streak length that (re)opens a bonus window.
pub const BONUS_STREAK: u32 = 5;

/// Number of correct answers a bonus window lasts.
pub const BONUS_LENGTH: u32 = 5;

/// Multiplier while a bonus window is open.
pub const BONUS_MULTIPLIER: u32 = 2;

/// Running score of a run.
///
/// Invariants: `best_streak >= streak`; `bonus_remaining > 0` exactly when
/// `bonus_multiplier == 2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreState {
    /// Accumulated score (may go negative)
    pub score: i64,
    /// Current run of consecutive correct answers
    pub streak: u32,
    /// Longest streak this run
    pub best_streak: u32,
    /// 1 normally, 2 inside a bonus window
    pub bonus_multiplier: u32,
    /// Correct answers left in the bonus window
    pub bonus_remaining: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreState {
    /// Fresh state for a new run.
    pub const fn new() -> Self {
        Self {
            score: 0,
            streak: 0,
            best_streak: 0,
            bonus_multiplier: 1,
            bonus_remaining: 0,
        }
    }

    /// Is a bonus window open?
    #[inline]
    pub fn bonus_active(&self) -> bool {
        self.bonus_remaining > 0
    }
}

/// One scoring input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreEvent {
    /// Correct answer after `response_ms` on a card with `per_card_ms` budget.
    Correct {
        /// Time since the card appeared
        response_ms: u64,
        /// Card time budget
        per_card_ms: u64,
    },
    /// Wrong answer.
    Wrong,
    /// Card clock ran out.
    Timeout,
}

/// Latency above which a correct answer earns the slow base points.
#[inline]
pub fn slow_threshold_ms(per_card_ms: u64) -> u64 {
    // floor(0.8 * budget)
    per_card_ms * 4 / 5
}

/// Base points for a correct answer at this latency.
#[inline]
pub fn base_points(response_ms: u64, per_card_ms: u64) -> i64 {
    if response_ms > slow_threshold_ms(per_card_ms) {
        SLOW_POINTS
    } else {
        FAST_POINTS
    }
}

/// Apply one scoring event.
///
/// A streak milestone re-opens the bonus window even when one is already
/// open, so windows chain back to back at streaks 10, 15, 20, ...
pub fn apply_score_event(state: ScoreState, event: ScoreEvent) -> ScoreState {
    let mut next = state;

    match event {
        ScoreEvent::Correct { response_ms, per_card_ms } => {
            let points = base_points(response_ms, per_card_ms) * next.bonus_multiplier as i64;
            next.score += points;

            next.streak += 1;
            next.best_streak = next.best_streak.max(next.streak);

            // Consume bonus on correct only
            if next.bonus_remaining > 0 {
                next.bonus_remaining -= 1;
                if next.bonus_remaining == 0 {
                    next.bonus_multiplier = 1;
                }
            }

            if next.streak > 0 && next.streak % BONUS_STREAK == 0 {
                next.bonus_multiplier = BONUS_MULTIPLIER;
                next.bonus_remaining = BONUS_LENGTH;
            }
        }
        ScoreEvent::Wrong => {
            next.score -= WRONG_PENALTY;
            reset_streak(&mut next);
        }
        ScoreEvent::Timeout => {
            next.score -= TIMEOUT_PENALTY;
            reset_streak(&mut next);
        }
    }

    next
}

fn reset_streak(state: &mut ScoreState) {
    state.streak = 0;
    state.bonus_multiplier = 1;
    state.bonus_remaining = 0;
}

/// Score of a perfect run: every card answered correctly and fast.
pub fn max_score(card_count: usize, per_card_ms: u64) -> i64 {
    (0..card_count)
        .fold(ScoreState::new(), |s, _| {
            apply_score_event(s, ScoreEvent::Correct { response_ms: 0, per_card_ms })
        })
        .score
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BUDGET: u64 = 6000;

    fn fast() -> ScoreEvent {
        ScoreEvent::Correct { response_ms: 1000, per_card_ms: BUDGET }
    }

    fn apply_all(events: &[ScoreEvent]) -> ScoreState {
        events.iter().fold(ScoreState::new(), |s, e| apply_score_event(s, *e))
    }

    #[test]
    fn test_fast_and_slow_points() {
        // threshold = 4800
        let s = apply_score_event(ScoreState::new(), ScoreEvent::Correct { response_ms: 4800, per_card_ms: BUDGET });
        assert_eq!(s.score, 10);
        let s = apply_score_event(ScoreState::new(), ScoreEvent::Correct { response_ms: 4801, per_card_ms: BUDGET });
        assert_eq!(s.score, 6);
    }

    #[test]
    fn test_slow_threshold_floors() {
        assert_eq!(slow_threshold_ms(6000), 4800);
        assert_eq!(slow_threshold_ms(1001), 800);
        assert_eq!(slow_threshold_ms(0), 0);
    }

    #[test]
    fn test_wrong_and_timeout_penalties() {
        let s = apply_all(&[fast(), fast(), ScoreEvent::Wrong]);
        assert_eq!(s.score, 16);
        assert_eq!(s.streak, 0);
        assert_eq!(s.best_streak, 2);

        let s = apply_score_event(s, ScoreEvent::Timeout);
        assert_eq!(s.score, 10);
        assert_eq!(s.streak, 0);
    }

    #[test]
    fn test_five_correct_opens_bonus() {
        let s = apply_all(&[fast(); 5]);
        assert_eq!(s.streak, 5);
        assert_eq!(s.score, 50);
        assert_eq!(s.bonus_multiplier, 2);
        assert_eq!(s.bonus_remaining, 5);
    }

    #[test]
    fn test_sixth_through_tenth_are_doubled() {
        let mut s = apply_all(&[fast(); 5]);
        for _ in 6..=10 {
            let before = s.score;
            s = apply_score_event(s, fast());
            assert_eq!(s.score - before, 20);
        }
        // slow answer inside a window is doubled too
        let before = s.score;
        s = apply_score_event(s, ScoreEvent::Correct { response_ms: 5000, per_card_ms: BUDGET });
        assert_eq!(s.score - before, 12);
    }

    #[test]
    fn test_bonus_rechains_at_streak_milestones() {
        let mut s = ScoreState::new();
        for n in 1..=20u32 {
            s = apply_score_event(s, fast());
            if n >= 5 {
                // window never closes once the streak keeps growing
                assert_eq!(s.bonus_multiplier, 2, "streak {}", n);
            }
            if n % 5 == 0 {
                assert_eq!(s.bonus_remaining, 5, "streak {}", n);
            }
        }
        assert_eq!(s.streak, 20);
        assert_eq!(s.score, 50 + 15 * 20);
    }

    #[test]
    fn test_wrong_closes_bonus_window() {
        let s = apply_all(&[fast(), fast(), fast(), fast(), fast(), fast(), ScoreEvent::Wrong]);
        assert_eq!(s.bonus_multiplier, 1);
        assert_eq!(s.bonus_remaining, 0);
        let s = apply_score_event(s, fast());
        assert_eq!(s.score, 50 + 20 - 4 + 10);
    }

    #[test]
    fn test_max_score() {
        assert_eq!(max_score(0, BUDGET), 0);
        assert_eq!(max_score(5, BUDGET), 50);
        assert_eq!(max_score(20, BUDGET), 350);
        assert_eq!(max_score(25, BUDGET), 450);
    }

    fn score_event() -> impl Strategy<Value = ScoreEvent> {
        prop_oneof![
            (0u64..8000).prop_map(|ms| ScoreEvent::Correct { response_ms: ms, per_card_ms: BUDGET }),
            Just(ScoreEvent::Wrong),
            Just(ScoreEvent::Timeout),
        ]
    }

    proptest! {
        #[test]
        fn prop_best_streak_bounds_streak(events in prop::collection::vec(score_event(), 0..200)) {
            let mut s = ScoreState::new();
            let mut best = 0;
            for e in events {
                s = apply_score_event(s, e);
                prop_assert!(s.best_streak >= s.streak);
                prop_assert!(s.best_streak >= best);
                best = s.best_streak;
            }
        }

        #[test]
        fn prop_bonus_fields_agree(events in prop::collection::vec(score_event(), 0..200)) {
            let mut s = ScoreState::new();
            for e in events {
                s = apply_score_event(s, e);
                prop_assert_eq!(s.bonus_remaining > 0, s.bonus_multiplier == 2);
                prop_assert!(s.bonus_multiplier == 1 || s.bonus_multiplier == 2);
            }
        }

        #[test]
        fn prop_miss_resets_streak(events in prop::collection::vec(score_event(), 0..100), timeout in any::<bool>()) {
            let s = events.into_iter().fold(ScoreState::new(), apply_score_event);
            let miss = if timeout { ScoreEvent::Timeout } else { ScoreEvent::Wrong };
            let after = apply_score_event(s, miss);
            prop_assert_eq!(after.streak, 0);
            prop_assert_eq!(after.bonus_multiplier, 1);
            prop_assert_eq!(after.best_streak, s.best_streak);
        }
    }
}
