//! Session Inputs
//!
//! Everything that can happen to a session, as plain data. The scheduler
//! turns wall-clock sampling and player input into these; the reducer
//! consumes them one at a time.

use serde::{Serialize, Deserialize};

use crate::game::deck::PlayerAnswer;

/// One input to the session reducer.
///
/// Every variant except `Teardown` carries the session timestamp it
/// happened at; the reducer never reads a clock itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Start (or restart) a run.
    Start {
        /// Session timestamp
        now_ms: u64,
    },
    /// Player answered the current card.
    Answer {
        /// The answer given
        answer: PlayerAnswer,
        /// Session timestamp
        now_ms: u64,
    },
    /// Clock sample while playing.
    Tick {
        /// Session timestamp
        now_ms: u64,
    },
    /// The current card's clock ran out.
    CardExpired {
        /// Session timestamp
        now_ms: u64,
    },
    /// The reveal pause is over.
    RevealElapsed {
        /// Session timestamp
        now_ms: u64,
    },
    /// The session is going away; stop everything.
    Teardown,
}

impl Action {
    /// Choose a multiple-choice answer.
    pub fn choose(index: usize, now_ms: u64) -> Self {
        Action::Answer { answer: PlayerAnswer::Choice(index), now_ms }
    }

    /// Submit a typed answer.
    pub fn submit(text: impl Into<String>, now_ms: u64) -> Self {
        Action::Answer { answer: PlayerAnswer::Text(text.into()), now_ms }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Start { .. } => "start",
            Action::Answer { .. } => "answer",
            Action::Tick { .. } => "tick",
            Action::CardExpired { .. } => "card_expired",
            Action::RevealElapsed { .. } => "reveal_elapsed",
            Action::Teardown => "teardown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(
            Action::choose(2, 10),
            Action::Answer { answer: PlayerAnswer::Choice(2), now_ms: 10 }
        );
        assert_eq!(
            Action::submit("paris", 5),
            Action::Answer { answer: PlayerAnswer::Text("paris".into()), now_ms: 5 }
        );
        assert_eq!(Action::Teardown.name(), "teardown");
    }
}
