//! Skill Arena demo
//!
//! Plays one recorded solo session and verifies it by replay, then runs an
//! arena round through the async driver with a scripted player.

use anyhow::{bail, Context};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use skill_arena::{
    DeterministicRng, EngineConfig, GameKind, PlayerInput, VERSION,
    core::IntervalClock,
    driver::{self, Command, DriverHandle},
    game::{replay_session, Challenge, ChallengePayload, Color, Recorder, SessionEventData, SessionPhase},
    tournament::{default_opponents, Arena, ArenaEvent, Participant, TournamentEventData},
};

/// The demo runs the arena this many times faster than real time.
const DEMO_SPEEDUP: u32 = 50;

/// Upper bound on solo ticks, in case a config never finishes.
const MAX_SOLO_TICKS: u32 = 10_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => EngineConfig::default(),
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Skill Arena v{}", VERSION);
    info!("Game: {} (seed {})", config.game, config.seed);

    demo_solo(&config)?;
    demo_arena(&config).await?;
    Ok(())
}

/// Record a solo session, then replay it and compare hashes.
fn demo_solo(config: &EngineConfig) -> anyhow::Result<()> {
    info!("=== Solo Session ===");

    let mut recorder = Recorder::new(config.session_config());
    let mut player = DeterministicRng::new(config.seed ^ 0x5EED);
    recorder.start()?;

    let mut answered = None;
    for _ in 0..MAX_SOLO_TICKS {
        if recorder.session().is_finished() {
            break;
        }
        recorder.tick();

        let session = recorder.session();
        let Some(challenge) = session.active_challenge() else { continue };
        let repeatable = matches!(challenge.payload, ChallengePayload::Click);
        if session.phase() != SessionPhase::AwaitingInput || (answered == Some(challenge.id) && !repeatable) {
            continue;
        }
        answered = Some(challenge.id);

        // Four answers out of five are right.
        let inputs = if player.chance(80) {
            perfect_inputs(challenge)
        } else {
            vec![wrong_input(challenge)]
        };
        for input in inputs {
            recorder.submit_input(input);
        }
    }

    if !recorder.session().is_finished() {
        recorder.finish()?;
    }

    for event in recorder.session_mut().take_events() {
        if let SessionEventData::SessionFinished { final_score, challenges_completed, best_streak, .. } = event.data {
            info!(
                "Finished at tick {}: score {}, {} correct, best streak {}",
                event.tick, final_score, challenges_completed, best_streak
            );
        }
    }

    let stats = recorder.session().stats().clone();
    info!("Accuracy: {}% over {} attempts", stats.accuracy_pct(), stats.attempts);

    let log = recorder.into_log();
    let bytes = log.to_bytes()?;
    let hash = log.final_hash.map(hex::encode).unwrap_or_default();
    info!("Final State Hash: {}", hash);
    info!("Input log: {} entries, {} bytes", log.entries.len(), bytes.len());

    info!("=== Verifying Determinism ===");
    let replayed = replay_session(&log)?;
    if hex::encode(replayed.compute_hash()) == hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        bail!("replay diverged from the recorded session");
    }
    Ok(())
}

/// Play an arena round through the driver and print its report as JSON.
async fn demo_arena(config: &EngineConfig) -> anyhow::Result<()> {
    info!("=== Arena ===");

    let tournament = config.tournament_config();
    info!("{}: {} ticks", tournament.name, tournament.duration_ticks);

    let session = config.session_config();
    let game = session.kind;
    let arena = Arena::new(
        session,
        tournament,
        Participant::real(1, config.player_name.clone()),
        default_opponents(),
    )?;

    let clock = IntervalClock::new(config.ticks_per_second.max(1).saturating_mul(DEMO_SPEEDUP));
    let handle = driver::spawn(arena, clock, 64);
    let mut events = handle.subscribe();

    handle.send(Command::Start).await;
    autoplay(&handle, &mut events, game).await;

    let report = handle.shutdown().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// React to arena notifications until the tournament finishes.
async fn autoplay(
    handle: &DriverHandle<Arena>,
    events: &mut broadcast::Receiver<ArenaEvent>,
    game: GameKind,
) {
    let mut prompt = String::new();
    let mut revealed: Vec<Color> = Vec::new();

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "autoplay fell behind");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };

        match event {
            ArenaEvent::Session(event) => match event.data {
                SessionEventData::ChallengeIssued { prompt: next, .. } => {
                    prompt = next;
                    revealed.clear();
                }
                SessionEventData::ElementRevealed { color, .. } => revealed.push(color),
                SessionEventData::InputOpened { .. } => {
                    for input in answer_for(game, &prompt, &revealed) {
                        if !handle.send(Command::Input(input)).await {
                            return;
                        }
                    }
                }
                _ => {}
            },
            ArenaEvent::Tournament(event) => match event.data {
                TournamentEventData::TournamentFinished { awards, .. } => {
                    for award in awards {
                        info!("#{} {} wins {}", award.rank, award.display_name, award.prize);
                    }
                    return;
                }
                TournamentEventData::LeaderboardUpdated { standings } => {
                    if let Some(leader) = standings.first() {
                        debug!("Leader: {} ({})", leader.display_name, leader.score);
                    }
                }
                _ => {}
            },
        }
    }
}

/// Answer built only from what the player has been shown.
fn answer_for(game: GameKind, prompt: &str, revealed: &[Color]) -> Vec<PlayerInput> {
    match game {
        GameKind::SpeedClicker => vec![PlayerInput::Click; 3],
        GameKind::MemoryChain => revealed.iter().copied().map(PlayerInput::Color).collect(),
        GameKind::WordBlitz => vec![PlayerInput::Text(prompt.to_string())],
        GameKind::NumberNinja => match solve(prompt) {
            Some(value) => vec![PlayerInput::Answer(value.to_string())],
            None => Vec::new(),
        },
    }
}

/// Evaluate an arithmetic prompt such as `12 - 5`.
fn solve(prompt: &str) -> Option<i64> {
    let mut parts = prompt.split_whitespace();
    let lhs: i64 = parts.next()?.parse().ok()?;
    let op = parts.next()?;
    let rhs: i64 = parts.next()?.parse().ok()?;
    match op {
        "+" => lhs.checked_add(rhs),
        "-" => lhs.checked_sub(rhs),
        "×" | "*" | "x" => lhs.checked_mul(rhs),
        _ => None,
    }
}

fn perfect_inputs(challenge: &Challenge) -> Vec<PlayerInput> {
    match &challenge.payload {
        ChallengePayload::Click => vec![PlayerInput::Click],
        ChallengePayload::Recall { sequence } => {
            sequence.iter().copied().map(PlayerInput::Color).collect()
        }
        ChallengePayload::Word { word } => vec![PlayerInput::Text(word.clone())],
        ChallengePayload::Arithmetic { .. } => {
            vec![PlayerInput::Answer(challenge.payload.expected_answer())]
        }
    }
}

fn wrong_input(challenge: &Challenge) -> PlayerInput {
    match &challenge.payload {
        ChallengePayload::Click => PlayerInput::Click,
        ChallengePayload::Recall { sequence } => {
            let first = sequence.first().copied().unwrap_or(Color::Red);
            let other = Color::ALL.iter().copied().find(|c| *c != first).unwrap_or(Color::Blue);
            PlayerInput::Color(other)
        }
        ChallengePayload::Word { .. } => PlayerInput::Text("#".to_string()),
        ChallengePayload::Arithmetic { .. } => PlayerInput::Answer("-1".to_string()),
    }
}
