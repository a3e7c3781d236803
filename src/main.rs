//! Daily Recall
//!
//! Plays today's run with a scripted bot on a simulated clock, prints the
//! share block and token, and checks the run replays identically.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use daily_recall::{
    VERSION,
    config::AppConfig,
    core::rng::DeterministicRng,
    game::{
        deck::{AnswerMode, PlayerAnswer},
        input::Action,
        seed::utc_day_key,
        state::{Phase, PlayState},
        summary::RunSummary,
        tick::replay,
    },
    share::{
        link::ShortLinks,
        token::{decode, decode_token, encode},
    },
    session::{
        play::{PlaySession, SessionSetup},
        store::{JsonFileStore, KeyValueStore, MemoryStore},
    },
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().context("reading configuration")?;
    info!("Daily Recall v{}", VERSION);

    if let Some(token) = &config.share_token {
        show_shared_run(token);
        return Ok(());
    }

    match &config.store_path {
        Some(path) => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("opening store {}", path.display()))?;
            demo_run(&config, store)
        }
        None => demo_run(&config, MemoryStore::new()),
    }
}

/// Decode a shared token and print it, the way a results page would.
fn show_shared_run(token: &str) {
    match decode_token(token) {
        Ok(run) => {
            info!("Decoded {:?} token", run.format);
            if let Some(legacy) = &run.legacy {
                info!(
                    "Legacy run {} ({} of {} correct)",
                    legacy.run_id, legacy.correct, legacy.answered
                );
            }
            println!("{}", run.summary.share_text());
        }
        Err(e) => warn!("Invalid or expired results link: {}", e),
    }
}

/// Play today's deck with the bot.
fn demo_run<S: KeyValueStore>(config: &AppConfig, store: S) -> Result<()> {
    let setup = SessionSetup::new(config.deck_id.clone(), utc_day_key())
        .with_mode(config.mode)
        .with_policy(config.policy)
        .with_overrides(config.overrides.clone());
    let mut session = PlaySession::new(setup, store);

    if session.phase() == Phase::Locked {
        info!("Already played today. Come back tomorrow!");
        if let Some(last) = session.last_run() {
            println!("{}", last.share_text());
        }
        return Ok(());
    }

    info!("=== Starting Demo Run ===");
    info!("Deck: {} ({} cards)", session.state().deck.label, session.state().deck.len());
    info!("Seed: {}", session.seed());

    let initial = session.state().clone();
    let actions = bot_actions(&mut session, config.bot_accuracy);
    let summary = match session.state().phase {
        Phase::Finished => RunSummary::from_state(session.state(), &session.state().config.tile_scheme),
        phase => bail!("bot run stopped in {:?}", phase),
    };

    info!("=== Run Results ===");
    println!("{}", summary.share_text());

    let token = encode(&summary);
    println!("r={}", token);
    if decode(&token).context("decoding our own token")? != summary {
        bail!("token did not round-trip");
    }

    let mut store = session.into_store();
    let mut links = ShortLinks::new(&mut store);
    let id = links.shorten(&token)?;
    info!("Short link id: {}", id);

    info!("=== Verifying Determinism ===");
    verify_replay(initial, actions, &summary)
}

/// Drive the session with a seeded bot on a simulated clock.
///
/// Returns every action dispatched, for replay.
fn bot_actions<S: KeyValueStore>(session: &mut PlaySession<S>, accuracy: u32) -> Vec<Action> {
    let mut rng = DeterministicRng::new(session.seed());
    let mut actions = Vec::new();
    let mut dispatch = |session: &mut PlaySession<S>, action: Action| {
        actions.push(action.clone());
        session.dispatch(action);
    };

    dispatch(session, Action::Start { now_ms: 0 });

    while session.phase() == Phase::Playing {
        let state = session.state();
        let config = state.config;
        let card_deadline = state.card_started_at + config.per_card_ms;

        // Think time runs past the card budget now and then
        let think_ms = 300 + rng.next_below((config.per_card_ms + 800) as u32) as u64;
        let answer_at = state.card_started_at + think_ms;

        let answer = state.current_card().map(|card| match &card.answer {
            AnswerMode::MultipleChoice { choices, correct_index } => {
                if rng.next_percent(accuracy) || choices.len() < 2 {
                    PlayerAnswer::Choice(*correct_index)
                } else {
                    let offset = 1 + rng.next_below(choices.len() as u32 - 1) as usize;
                    PlayerAnswer::Choice((correct_index + offset) % choices.len())
                }
            }
            AnswerMode::FreeText { answer } => {
                if rng.next_percent(accuracy) {
                    PlayerAnswer::Text(answer.clone())
                } else {
                    PlayerAnswer::Text("pass".to_string())
                }
            }
        });

        let now = if answer_at >= card_deadline {
            dispatch(session, Action::Tick { now_ms: card_deadline });
            card_deadline
        } else {
            dispatch(session, Action::Tick { now_ms: answer_at });
            if let (Phase::Playing, Some(answer)) = (session.phase(), answer) {
                dispatch(session, Action::Answer { answer, now_ms: answer_at });
            }
            answer_at
        };

        if session.phase() == Phase::Reveal {
            dispatch(session, Action::RevealElapsed { now_ms: now + config.reveal_ms });
        }
    }

    actions
}

/// Replay the recorded actions on a fresh state and compare.
fn verify_replay(mut state: PlayState, actions: Vec<Action>, summary: &RunSummary) -> Result<()> {
    replay(&mut state, actions);
    let replayed = RunSummary::from_state(&state, &state.config.tile_scheme);

    if &replayed == summary {
        info!("DETERMINISM VERIFIED: {}", replayed.headline());
        Ok(())
    } else {
        bail!("DETERMINISM FAILURE: replay gave {}", replayed.headline())
    }
}
