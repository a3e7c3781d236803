//! Wall-Clock Scheduler
//!
//! Runs a `PlaySession` in real time on tokio. The reducer asks for timers
//! through `TimerCommand`s; this loop owns the only two timers that exist
//! (the sampling ticker and the one-shot reveal deadline) and turns them,
//! plus player commands, into actions.
//!
//! Both timers live in this function's locals, so returning drops them:
//! nothing can fire into a finished or torn-down session.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};

use crate::game::events::{SessionEvent, TimerCommand};
use crate::game::input::Action;
use crate::game::state::Phase;
use crate::session::clock::SessionClock;
use crate::session::play::PlaySession;
use crate::session::store::KeyValueStore;

/// Input from the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Start a run.
    Start,
    /// Pick a multiple-choice answer.
    Choose(usize),
    /// Submit a typed answer.
    Submit(String),
    /// Leave the session.
    Quit,
}

/// Run `session` until the run finishes, the session is locked, the player
/// quits, or `commands` closes. Returns the torn-down session.
pub async fn drive<S: KeyValueStore>(
    session: PlaySession<S>,
    commands: mpsc::Receiver<PlayerCommand>,
) -> PlaySession<S> {
    drive_with_events(session, commands, None).await
}

/// Like [`drive`], also forwarding every session event to `events`.
pub async fn drive_with_events<S: KeyValueStore>(
    mut session: PlaySession<S>,
    mut commands: mpsc::Receiver<PlayerCommand>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
) -> PlaySession<S> {
    let clock = SessionClock::new();
    let period = Duration::from_millis(session.state().config.tick_ms.max(1));
    let mut ticker: Option<Interval> = None;
    let mut reveal_at: Option<Instant> = None;

    while session.phase() != Phase::Locked {
        let action = tokio::select! {
            _ = next_tick(&mut ticker) => Action::Tick { now_ms: clock.now_ms() },
            _ = deadline(reveal_at) => {
                reveal_at = None;
                Action::RevealElapsed { now_ms: clock.now_ms() }
            }
            command = commands.recv() => {
                let now_ms = clock.now_ms();
                match command {
                    Some(PlayerCommand::Start) => Action::Start { now_ms },
                    Some(PlayerCommand::Choose(index)) => Action::choose(index, now_ms),
                    Some(PlayerCommand::Submit(text)) => Action::submit(text, now_ms),
                    Some(PlayerCommand::Quit) => {
                        tracing::info!("player quit");
                        break;
                    }
                    None => {
                        tracing::debug!("command channel closed");
                        break;
                    }
                }
            }
        };

        let result = session.dispatch(action);

        for command in &result.timers {
            match *command {
                TimerCommand::StartTicker => {
                    let mut interval = interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    ticker = Some(interval);
                }
                TimerCommand::StopTicker => ticker = None,
                TimerCommand::ArmReveal { delay_ms } => {
                    reveal_at = Some(clock.instant_at(clock.now_ms() + delay_ms));
                }
                TimerCommand::ClearReveal => reveal_at = None,
            }
        }

        let finished = result.finished().is_some();
        if let Some(tx) = &events {
            for event in result.events {
                // Nobody listening is fine
                let _ = tx.send(event);
            }
        }
        if finished {
            break;
        }
    }

    session.dispatch(Action::Teardown);
    session
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::deck::AnswerMode;
    use crate::game::state::{FinishReason, Mode, ModePolicy};
    use crate::session::play::SessionSetup;
    use crate::session::store::{played_key, MemoryStore};

    const DAY: &str = "2024-01-15";

    fn session(mode: Mode) -> PlaySession<MemoryStore> {
        let setup = SessionSetup::new("nfl-playoffs", DAY)
            .with_mode(mode)
            .with_policy(ModePolicy { allow_sudden_death: true });
        PlaySession::new(setup, MemoryStore::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_sudden_death_timeout_ends_run() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(PlayerCommand::Start).await.unwrap();

        let started = Instant::now();
        let session = drive(session(Mode::SuddenDeath), rx).await;

        let state = session.state();
        assert_eq!(state.phase, Phase::Finished);
        assert_eq!(state.finish_reason, Some(FinishReason::SuddenDeathTimeout));
        assert_eq!(state.stats.timeout, 1);
        assert_eq!(state.stats.answered, 1);
        assert!(state.torn_down);
        // card budget plus reveal pause
        assert!(started.elapsed() >= Duration::from_millis(6_200));
        assert!(session.is_played_today());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sprint_runs_out_of_time() {
        let (tx, rx) = mpsc::channel(8);
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        tx.send(PlayerCommand::Start).await.unwrap();

        let session = drive_with_events(session(Mode::Sprint), rx, Some(events_tx)).await;

        let state = session.state();
        assert_eq!(state.phase, Phase::Finished);
        assert_eq!(state.finish_reason, Some(FinishReason::TimeUp));
        assert!(state.stats.answered > 0);
        assert_eq!(state.stats.answered, state.stats.timeout);

        let mut saw_start = false;
        let mut finished = None;
        while let Ok(event) = events_rx.try_recv() {
            match event {
                SessionEvent::RunStarted { .. } => saw_start = true,
                SessionEvent::RunFinished { reason, summary } => finished = Some((reason, summary)),
                _ => {}
            }
        }
        assert!(saw_start);
        let (reason, summary) = finished.unwrap();
        assert_eq!(reason, FinishReason::TimeUp);
        assert_eq!(summary.tiles.len(), state.stats.answered as usize);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_tears_down_mid_run() {
        let session = session(Mode::Sprint);
        let first = match &session.state().deck.cards[0].answer {
            AnswerMode::MultipleChoice { correct_index, .. } => *correct_index,
            AnswerMode::FreeText { .. } => unreachable!(),
        };

        let (tx, rx) = mpsc::channel(8);
        tx.send(PlayerCommand::Start).await.unwrap();
        tx.send(PlayerCommand::Choose(first)).await.unwrap();
        tx.send(PlayerCommand::Quit).await.unwrap();

        let session = drive(session, rx).await;
        let state = session.state();
        assert!(state.torn_down);
        assert_eq!(state.stats.correct, 1);
        assert_eq!(state.phase, Phase::Reveal);
        assert!(!session.is_played_today());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_ends_drive() {
        let (tx, rx) = mpsc::channel::<PlayerCommand>(1);
        drop(tx);
        let session = drive(session(Mode::Sprint), rx).await;
        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.state().torn_down);
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_session_returns_immediately() {
        let mut store = MemoryStore::new();
        store.set(&played_key("nfl-playoffs", DAY), "1").unwrap();
        let locked = PlaySession::new(SessionSetup::new("nfl-playoffs", DAY), store);

        let (_tx, rx) = mpsc::channel(1);
        let session = drive(locked, rx).await;
        assert_eq!(session.phase(), Phase::Locked);
        assert!(session.state().torn_down);
    }
}
