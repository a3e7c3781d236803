//! Session Reducer
//!
//! The whole play-session state machine as one function:
//! `step(&mut state, action) -> StepResult`.
//!
//! ```text
//! Ready ──start──► Playing ──answer/expire──► Reveal ──elapsed──► Playing (next card)
//!   ▲                 │                          │
//!   │                 └──time up──┐              └──last card / sudden miss──┐
//!   │                             ▼                                          ▼
//!   └────────start (unlocked)─── Finished ◄──────────────────────────────────┘
//!
//! Locked: entered at construction, never left.
//! ```
//!
//! The reducer never reads a clock. Every timestamp arrives inside the
//! action, and every timer the caller should run comes back as a
//! `TimerCommand`. Invalid actions are no-ops and return an empty result.

use crate::game::events::{SessionEvent, StepResult, TimerCommand};
use crate::game::input::Action;
use crate::game::deck::PlayerAnswer;
use crate::game::scoring::{apply_score_event, ScoreEvent};
use crate::game::state::{AnswerEvent, FinishReason, Mode, Phase, PlayState};
use crate::game::summary::RunSummary;

/// Apply one action to the session.
///
/// # Determinism
///
/// Same state and same action always give the same next state and result.
pub fn step(state: &mut PlayState, action: Action) -> StepResult {
    let mut result = StepResult::default();

    if state.torn_down {
        return result;
    }

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(action = action.name(), phase = ?state.phase, index = state.index, "step");

    match action {
        Action::Start { now_ms } => start(state, now_ms, &mut result),
        Action::Answer { answer, now_ms } => answer_card(state, &answer, now_ms, &mut result),
        Action::Tick { now_ms } => tick(state, now_ms, &mut result),
        Action::CardExpired { now_ms } => {
            if state.phase == Phase::Playing {
                expire_card(state, now_ms, &mut result);
            } else {
                ignored(state, "card_expired");
            }
        }
        Action::RevealElapsed { now_ms } => reveal_elapsed(state, now_ms, &mut result),
        Action::Teardown => {
            state.torn_down = true;
            result.timer(TimerCommand::StopTicker);
            result.timer(TimerCommand::ClearReveal);
            tracing::debug!(phase = ?state.phase, "session torn down");
        }
    }

    result
}

/// Pure form of [`step`].
pub fn reduce(mut state: PlayState, action: Action) -> (PlayState, StepResult) {
    let result = step(&mut state, action);
    (state, result)
}

/// Apply actions in order, collecting every result. Used for replays.
pub fn replay(state: &mut PlayState, actions: impl IntoIterator<Item = Action>) -> Vec<StepResult> {
    actions.into_iter().map(|a| step(state, a)).collect()
}

// =============================================================================
// TRANSITIONS
// =============================================================================

fn ignored(state: &PlayState, action: &'static str) {
    tracing::debug!(action, phase = ?state.phase, "ignoring action in this phase");
}

fn start(state: &mut PlayState, now_ms: u64, result: &mut StepResult) {
    match state.phase {
        Phase::Locked => {
            result.event(SessionEvent::StartRefused);
            tracing::info!(day = %state.day_key, "start refused, already played today");
            return;
        }
        Phase::Playing | Phase::Reveal => {
            ignored(state, "start");
            return;
        }
        Phase::Ready | Phase::Finished => {}
    }

    if state.played {
        state.phase = Phase::Locked;
        result.event(SessionEvent::StartRefused);
        tracing::info!(day = %state.day_key, "start refused, already played today");
        return;
    }

    state.reset_run(now_ms);
    state.phase = Phase::Playing;
    result.timer(TimerCommand::ClearReveal);
    result.event(SessionEvent::RunStarted {
        mode: state.config.mode,
        card_count: state.deck.len(),
    });
    tracing::info!(
        deck = %state.deck.id,
        day = %state.day_key,
        mode = state.config.mode.tag(),
        cards = state.deck.len(),
        "run started"
    );

    if state.deck.is_empty() {
        finish(state, FinishReason::DeckComplete, result);
    } else {
        result.timer(TimerCommand::StartTicker);
    }
}

fn answer_card(state: &mut PlayState, answer: &PlayerAnswer, now_ms: u64, result: &mut StepResult) {
    if state.phase != Phase::Playing {
        ignored(state, "answer");
        return;
    }
    let correct = match state.current_card().and_then(|card| card.check(answer)) {
        Some(correct) => correct,
        None => {
            tracing::debug!(index = state.index, "answer does not fit the card, ignoring");
            return;
        }
    };

    let per_card_ms = state.config.per_card_ms;
    let response_ms = now_ms.saturating_sub(state.card_started_at);
    let score_event = if correct {
        ScoreEvent::Correct { response_ms, per_card_ms }
    } else {
        ScoreEvent::Wrong
    };

    state.last_choice = match answer {
        PlayerAnswer::Choice(i) => Some(*i),
        PlayerAnswer::Text(_) => None,
    };
    record(state, score_event, AnswerEvent::answered(correct, response_ms), result);
}

fn expire_card(state: &mut PlayState, _now_ms: u64, result: &mut StepResult) {
    let per_card_ms = state.config.per_card_ms;
    state.card_remaining_ms = 0;
    state.last_choice = None;
    record(state, ScoreEvent::Timeout, AnswerEvent::timed_out(per_card_ms), result);
}

/// Score and record an answer, then enter the reveal pause.
fn record(state: &mut PlayState, score_event: ScoreEvent, event: AnswerEvent, result: &mut StepResult) {
    state.score = apply_score_event(state.score, score_event);
    state.stats.record(&event);
    state.answers.push(event);
    state.phase = Phase::Reveal;

    result.timer(TimerCommand::StopTicker);
    result.timer(TimerCommand::ClearReveal);
    result.timer(TimerCommand::ArmReveal { delay_ms: state.config.reveal_ms });
    result.event(SessionEvent::AnswerRecorded {
        index: state.index,
        event,
        score: state.score.score,
    });
    tracing::debug!(
        index = state.index,
        correct = event.correct,
        timeout = event.timeout,
        response_ms = event.response_ms,
        score = state.score.score,
        streak = state.score.streak,
        "answer recorded"
    );
}

fn tick(state: &mut PlayState, now_ms: u64, result: &mut StepResult) {
    if state.phase != Phase::Playing {
        return;
    }

    // Derived from timestamps every time so a late tick can't drift
    let run_elapsed = now_ms.saturating_sub(state.run_started_at);
    let card_elapsed = now_ms.saturating_sub(state.card_started_at);
    state.remaining_ms = state.config.total_ms.saturating_sub(run_elapsed);
    state.card_remaining_ms = state.config.per_card_ms.saturating_sub(card_elapsed);

    if state.remaining_ms == 0 {
        finish(state, FinishReason::TimeUp, result);
    } else if state.card_remaining_ms == 0 {
        expire_card(state, now_ms, result);
    }
}

fn reveal_elapsed(state: &mut PlayState, now_ms: u64, result: &mut StepResult) {
    if state.phase != Phase::Reveal {
        ignored(state, "reveal_elapsed");
        return;
    }

    let last = state.answers.last().copied();
    if state.config.mode == Mode::SuddenDeath {
        if let Some(last) = last.filter(AnswerEvent::is_miss) {
            let reason = if last.timeout {
                FinishReason::SuddenDeathTimeout
            } else {
                FinishReason::SuddenDeathWrong
            };
            finish(state, reason, result);
            return;
        }
    }

    if !state.has_next_card() {
        finish(state, FinishReason::DeckComplete, result);
        return;
    }

    state.index += 1;
    state.card_started_at = now_ms;
    state.card_remaining_ms = state.config.per_card_ms;
    state.last_choice = None;
    state.phase = Phase::Playing;
    result.timer(TimerCommand::ClearReveal);
    result.timer(TimerCommand::StartTicker);
    result.event(SessionEvent::CardAdvanced { index: state.index });
}

fn finish(state: &mut PlayState, reason: FinishReason, result: &mut StepResult) {
    state.phase = Phase::Finished;
    state.played = true;
    state.finish_reason = Some(reason);

    result.timer(TimerCommand::StopTicker);
    result.timer(TimerCommand::ClearReveal);

    let summary = RunSummary::from_state(state, &state.config.tile_scheme);
    tracing::info!(
        %reason,
        score = summary.score,
        accuracy = summary.accuracy_percent,
        answered = state.stats.answered,
        "run finished"
    );
    result.event(SessionEvent::RunFinished { reason, summary });
}

// =============================================================================
// TESTS
// =============================================================================
