//! Play Session
//!
//! Wraps the pure reducer with everything it must not do itself: deciding
//! the day's deck, reading the "already played" marker, assigning run ids,
//! and persisting the finished run.

use uuid::Uuid;

use crate::game::events::{SessionEvent, StepResult};
use crate::game::input::Action;
use crate::game::seed::{daily_deck, DayOverrides};
use crate::game::state::{Mode, ModePolicy, Phase, PlayConfig, PlayState};
use crate::game::summary::RunSummary;
use crate::game::tick::step;
use crate::game::tiles::TileScheme;
use crate::share::token::{decode_or_none, encode};
use crate::session::store::{last_run_key, played_key, KeyValueStore, StoreError};

/// Value stored under the played marker.
pub const PLAYED_MARKER: &str = "1";

/// How to build a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSetup {
    /// Requested deck (unknown ids fall back to the default deck)
    pub deck_id: String,
    /// Requested mode (subject to `policy`)
    pub mode: Mode,
    /// Which modes are allowed
    pub policy: ModePolicy,
    /// Dev overrides for day and seed
    pub overrides: DayOverrides,
    /// Today's real UTC day key
    pub today: String,
    /// Tile scheme for the share grid
    pub tile_scheme: TileScheme,
}

impl SessionSetup {
    /// Sprint on `deck_id` for `today`, no overrides.
    pub fn new(deck_id: impl Into<String>, today: impl Into<String>) -> Self {
        Self {
            deck_id: deck_id.into(),
            mode: Mode::Sprint,
            policy: ModePolicy::default(),
            overrides: DayOverrides::none(),
            today: today.into(),
            tile_scheme: TileScheme::Outcome,
        }
    }

    /// Request a mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the mode policy.
    pub fn with_policy(mut self, policy: ModePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Apply dev overrides.
    pub fn with_overrides(mut self, overrides: DayOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Use a different tile scheme.
    pub fn with_tile_scheme(mut self, scheme: TileScheme) -> Self {
        self.tile_scheme = scheme;
        self
    }
}

/// One player's session for one deck and day.
#[derive(Debug)]
pub struct PlaySession<S> {
    state: PlayState,
    store: S,
    seed: u32,
    run_id: Option<Uuid>,
}

impl<S: KeyValueStore> PlaySession<S> {
    /// Build the session. Enters `Locked` if today's run was already played.
    pub fn new(setup: SessionSetup, store: S) -> Self {
        let mode = setup.policy.resolve(setup.mode);
        let daily = daily_deck(&setup.deck_id, &setup.overrides, &setup.today);

        let mut config = PlayConfig::for_mode(mode);
        config.tile_scheme = setup.tile_scheme;

        let played = read_played(&store, &daily.deck.id, &daily.day_key);
        if let Some(dev) = setup.overrides.describe() {
            tracing::info!("{}", dev);
        }
        tracing::info!(
            deck = %daily.deck.id,
            day = %daily.day_key,
            seed = daily.seed,
            mode = mode.tag(),
            played,
            "session ready"
        );

        Self {
            state: PlayState::new(daily.deck, daily.day_key, config, played),
            store,
            seed: daily.seed,
            run_id: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> &PlayState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Seed the deck order came from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Id of the current (or last) run.
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Feed one action through the reducer.
    ///
    /// A finished run is persisted before this returns. Persistence
    /// failures are logged; the run still counts as finished.
    pub fn dispatch(&mut self, action: Action) -> StepResult {
        if matches!(action, Action::Start { .. }) && !self.state.played {
            // Another session may have finished today's run since we were built
            self.state.played = read_played(&self.store, &self.state.deck.id, &self.state.day_key);
        }

        let result = step(&mut self.state, action);

        for event in &result.events {
            match event {
                SessionEvent::RunStarted { .. } => {
                    let id = Uuid::new_v4();
                    self.run_id = Some(id);
                    tracing::info!(run_id = %id, "assigned run id");
                }
                SessionEvent::RunFinished { reason, summary } => {
                    tracing::info!(
                        run_id = ?self.run_id,
                        %reason,
                        "{}",
                        summary.headline()
                    );
                    if let Err(e) = self.persist(summary) {
                        tracing::warn!(error = %e, "failed to persist finished run");
                    }
                }
                _ => {}
            }
        }

        result
    }

    fn persist(&mut self, summary: &RunSummary) -> Result<(), StoreError> {
        let deck_id = &self.state.deck.id;
        let day_key = &self.state.day_key;
        self.store.set(&last_run_key(deck_id, day_key), &encode(summary))?;
        self.store.set(&played_key(deck_id, day_key), PLAYED_MARKER)?;
        Ok(())
    }

    /// Clear today's played marker so a later start is allowed.
    ///
    /// Only affects a session that is not `Locked`; a locked session stays
    /// locked until it is rebuilt.
    pub fn unlock(&mut self) -> Result<(), StoreError> {
        self.store.delete(&played_key(&self.state.deck.id, &self.state.day_key))?;
        self.state.played = false;
        tracing::info!(deck = %self.state.deck.id, day = %self.state.day_key, "unlocked today's run");
        Ok(())
    }

    /// Is today's run marked as played in the store?
    pub fn is_played_today(&self) -> bool {
        read_played(&self.store, &self.state.deck.id, &self.state.day_key)
    }

    /// Summary of the last finished run today, if one was saved.
    pub fn last_run(&self) -> Option<RunSummary> {
        let key = last_run_key(&self.state.deck.id, &self.state.day_key);
        match self.store.get(&key) {
            Ok(Some(token)) => decode_or_none(&token),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last run");
                None
            }
        }
    }
}

fn read_played<S: KeyValueStore>(store: &S, deck_id: &str, day_key: &str) -> bool {
    match store.get(&played_key(deck_id, day_key)) {
        Ok(value) => value.is_some(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read played marker, assuming not played");
            false
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::deck::AnswerMode;
    use crate::game::state::FinishReason;
    use crate::session::store::MemoryStore;

    const DAY: &str = "2024-01-15";

    fn correct_choice(session: &PlaySession<MemoryStore>) -> usize {
        match &session.state().current_card().unwrap().answer {
            AnswerMode::MultipleChoice { correct_index, .. } => *correct_index,
            AnswerMode::FreeText { .. } => panic!("expected multiple choice"),
        }
    }

    fn play_out(session: &mut PlaySession<MemoryStore>) -> RunSummary {
        session.dispatch(Action::Start { now_ms: 0 });
        let mut now = 0;
        loop {
            now += 1_000;
            let idx = correct_choice(session);
            session.dispatch(Action::choose(idx, now));
            now += 200;
            if let Some(summary) = session.dispatch(Action::RevealElapsed { now_ms: now }).finished() {
                return summary.clone();
            }
        }
    }

    #[test]
    fn test_session_uses_daily_order() {
        let session = PlaySession::new(SessionSetup::new("nfl-playoffs", DAY), MemoryStore::new());
        assert_eq!(session.seed(), 78815534);
        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.state().day_key, DAY);
    }

    #[test]
    fn test_sudden_death_pinned_by_default() {
        let setup = SessionSetup::new("nfl-playoffs", DAY).with_mode(Mode::SuddenDeath);
        let pinned = PlaySession::new(setup.clone(), MemoryStore::new());
        assert_eq!(pinned.state().config.mode, Mode::Sprint);

        let allowed = PlaySession::new(
            setup.with_policy(ModePolicy { allow_sudden_death: true }),
            MemoryStore::new(),
        );
        assert_eq!(allowed.state().config.mode, Mode::SuddenDeath);
    }

    #[test]
    fn test_finish_persists_marker_and_token() {
        let mut session = PlaySession::new(SessionSetup::new("nfl-playoffs", DAY), MemoryStore::new());
        let summary = play_out(&mut session);
        assert!(session.run_id().is_some());
        assert_eq!(session.state().finish_reason, Some(FinishReason::DeckComplete));

        let store = session.store();
        assert_eq!(
            store.get(&played_key("nfl-playoffs", DAY)).unwrap().as_deref(),
            Some(PLAYED_MARKER)
        );
        assert_eq!(
            store.get(&last_run_key("nfl-playoffs", DAY)).unwrap(),
            Some(encode(&summary))
        );
        assert_eq!(session.last_run(), Some(summary));
    }

    #[test]
    fn test_played_marker_locks_new_session() {
        let mut first = PlaySession::new(SessionSetup::new("nfl-playoffs", DAY), MemoryStore::new());
        play_out(&mut first);
        let store = first.into_store();

        let mut second = PlaySession::new(SessionSetup::new("nfl-playoffs", DAY), store);
        assert_eq!(second.phase(), Phase::Locked);
        let result = second.dispatch(Action::Start { now_ms: 0 });
        assert_eq!(result.events, vec![SessionEvent::StartRefused]);
        assert!(second.run_id().is_none());

        // Another day is open
        let store = second.into_store();
        let tomorrow = PlaySession::new(SessionSetup::new("nfl-playoffs", "2024-01-16"), store);
        assert_eq!(tomorrow.phase(), Phase::Ready);
    }

    #[test]
    fn test_start_rechecks_store() {
        let mut store = MemoryStore::new();
        let mut session = PlaySession::new(SessionSetup::new("demo", DAY), &mut store);
        assert_eq!(session.phase(), Phase::Ready);

        // Marker appears after construction
        session.store.set(&played_key("demo", DAY), PLAYED_MARKER).unwrap();
        let result = session.dispatch(Action::Start { now_ms: 0 });
        assert_eq!(result.events, vec![SessionEvent::StartRefused]);
        assert_eq!(session.phase(), Phase::Locked);
    }

    #[test]
    fn test_unlock_allows_replay() {
        let mut session = PlaySession::new(SessionSetup::new("nfl-playoffs", DAY), MemoryStore::new());
        play_out(&mut session);
        let first_run = session.run_id();
        assert!(session.is_played_today());

        session.unlock().unwrap();
        assert!(!session.is_played_today());
        let result = session.dispatch(Action::Start { now_ms: 100_000 });
        assert!(matches!(result.events[0], SessionEvent::RunStarted { .. }));
        assert_eq!(session.phase(), Phase::Playing);
        assert_ne!(session.run_id(), first_run);
        // The last run stays readable until the new one finishes
        assert!(session.last_run().is_some());
    }

    #[test]
    fn test_unlock_does_not_leave_locked() {
        let mut store = MemoryStore::new();
        store.set(&played_key("nfl-playoffs", DAY), PLAYED_MARKER).unwrap();
        let mut session = PlaySession::new(SessionSetup::new("nfl-playoffs", DAY), store);
        session.unlock().unwrap();
        session.dispatch(Action::Start { now_ms: 0 });
        assert_eq!(session.phase(), Phase::Locked);
    }

    #[test]
    fn test_overrides_reach_the_deck() {
        let overrides = DayOverrides::from_query("day=2024-01-16");
        let setup = SessionSetup::new("nfl-playoffs", "2030-01-01").with_overrides(overrides);
        let session = PlaySession::new(setup, MemoryStore::new());
        assert_eq!(session.state().day_key, "2024-01-16");
        assert_eq!(session.seed(), 78815535);
    }

    #[test]
    fn test_last_run_ignores_bad_token() {
        let mut store = MemoryStore::new();
        store.set(&last_run_key("demo", DAY), "abcde").unwrap();
        let session = PlaySession::new(SessionSetup::new("demo", DAY), store);
        assert_eq!(session.last_run(), None);
    }
}
