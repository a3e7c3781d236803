//! Session Events
//!
//! What the reducer reports back: observable events for the UI and the
//! persistence layer, and timer commands for whatever scheduler drives it.

use serde::{Serialize, Deserialize};

use crate::game::state::{AnswerEvent, FinishReason, Mode};
use crate::game::summary::RunSummary;

/// Something observable happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A run started.
    RunStarted {
        /// Mode the run is played in
        mode: Mode,
        /// Cards in today's deck
        card_count: usize,
    },
    /// An answer (or timeout) was recorded for card `index`.
    AnswerRecorded {
        /// Card position in the run
        index: usize,
        /// What was recorded
        event: AnswerEvent,
        /// Score after this answer
        score: i64,
    },
    /// Moved on to card `index`.
    CardAdvanced {
        /// New current card
        index: usize,
    },
    /// The run is over.
    RunFinished {
        /// Why it ended
        reason: FinishReason,
        /// The finished run
        summary: RunSummary,
    },
    /// Start was refused because today's run is locked.
    StartRefused,
}

impl SessionEvent {
    /// Summary carried by a `RunFinished` event.
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            SessionEvent::RunFinished { summary, .. } => Some(summary),
            _ => None,
        }
    }
}

/// Instruction to the scheduler.
///
/// The ticker samples the clock every `tick_ms` while a card is live;
/// the reveal timer fires once, `delay_ms` after an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerCommand {
    /// Begin sampling the clock.
    StartTicker,
    /// Stop sampling the clock.
    StopTicker,
    /// Fire `RevealElapsed` after `delay_ms`.
    ArmReveal {
        /// Reveal pause
        delay_ms: u64,
    },
    /// Drop any pending reveal.
    ClearReveal,
}

/// Output of one reducer step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepResult {
    /// Events, in the order they happened
    pub events: Vec<SessionEvent>,
    /// Timer commands, to apply in order
    pub timers: Vec<TimerCommand>,
}

impl StepResult {
    /// Nothing happened.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.timers.is_empty()
    }

    /// The finished-run summary, if this step finished the run.
    pub fn finished(&self) -> Option<&RunSummary> {
        self.events.iter().find_map(SessionEvent::summary)
    }

    pub(crate) fn event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub(crate) fn timer(&mut self, command: TimerCommand) {
        self.timers.push(command);
    }
}
