//! Arena: one real participant's session merged with a tournament roster.
//!
//! The tournament owns the clock that matters: its countdown and duration
//! replace the session's own, the session's score is mirrored into the
//! roster after every input and tick, and the session is closed with the
//! final rank when the tournament finishes.

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::game::{PlayerInput, Session, SessionConfig, SessionEvent, SessionPhase, Verdict};
use super::aggregator::{Tournament, TournamentConfig, TournamentStatus};
use super::events::TournamentEvent;
use super::roster::{Participant, ParticipantId};

/// Notification from either half of an arena.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArenaEvent {
    /// From the real participant's session
    Session(SessionEvent),
    /// From the tournament
    Tournament(TournamentEvent),
}

/// Final result for the real participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaOutcome {
    /// Session score
    pub final_score: u64,
    /// Final tournament rank
    pub final_rank: u32,
    /// Prize won, if any
    pub prize: Option<String>,
    /// Correct answers
    pub challenges_completed: u32,
}

/// A session playing inside a tournament.
#[derive(Clone, Debug)]
pub struct Arena {
    session: Session,
    tournament: Tournament,
    real: ParticipantId,
    outcome: Option<ArenaOutcome>,
}

impl Arena {
    /// Build an arena and seat everyone in the lobby.
    ///
    /// The session's countdown is aligned with the tournament's and its
    /// own time limit is dropped.
    pub fn new(
        mut session_config: SessionConfig,
        tournament_config: TournamentConfig,
        real: Participant,
        opponents: Vec<Participant>,
    ) -> Result<Self, EngineError> {
        session_config.countdown_ticks = tournament_config.countdown_ticks;
        session_config.session_duration_ticks = None;

        let real_id = real.id;
        let mut tournament = Tournament::new(tournament_config);
        tournament.join(real)?;
        for opponent in opponents {
            tournament.join(opponent)?;
        }

        Ok(Self {
            session: Session::new(session_config),
            tournament,
            real: real_id,
            outcome: None,
        })
    }

    /// The real participant's session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The tournament.
    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    /// The real participant's id.
    pub fn real_participant(&self) -> ParticipantId {
        self.real
    }

    /// Result once the tournament has finished.
    pub fn outcome(&self) -> Option<&ArenaOutcome> {
        self.outcome.as_ref()
    }

    /// Whether the tournament has finished.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Start both halves.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.session.phase() != SessionPhase::Idle {
            return Err(EngineError::invalid("start", self.session.phase()));
        }
        self.tournament.begin()?;
        self.session.start()
    }

    /// Forward an input to the session and mirror the new score.
    pub fn submit_input(&mut self, input: PlayerInput) -> Option<Verdict> {
        let verdict = self.session.submit_input(input)?;
        self.sync_score();
        Some(verdict)
    }

    /// Advance both halves one tick.
    pub fn tick(&mut self) {
        self.session.tick();
        self.sync_score();
        if self.tournament.tick() {
            self.conclude();
        }
    }

    /// End the tournament now.
    pub fn finish(&mut self) -> Result<(), EngineError> {
        self.sync_score();
        self.tournament.finalize()?;
        self.conclude();
        Ok(())
    }

    /// Back to the lobby with a fresh session.
    pub fn reset(&mut self) {
        self.session.reset();
        self.tournament.reset();
        self.outcome = None;
    }

    /// Drain events from both halves, session first.
    pub fn take_events(&mut self) -> Vec<ArenaEvent> {
        let mut events: Vec<ArenaEvent> = self
            .session
            .take_events()
            .into_iter()
            .map(ArenaEvent::Session)
            .collect();
        events.extend(
            self.tournament
                .take_events()
                .into_iter()
                .map(ArenaEvent::Tournament),
        );
        events
    }

    fn sync_score(&mut self) {
        if !matches!(
            self.tournament.status(),
            TournamentStatus::Countdown | TournamentStatus::Active
        ) {
            return;
        }
        if let Err(err) =
            self.tournament
                .record_score(self.real, self.session.score(), self.session.streak())
        {
            debug!(%err, "score sync rejected");
        }
    }

    fn conclude(&mut self) {
        let final_rank = self
            .tournament
            .participant(self.real)
            .map_or(0, |p| p.rank);

        if self.session.phase().is_running() {
            if let Err(err) = self.session.finish_with_rank(Some(final_rank)) {
                debug!(%err, "session already stopped");
            }
        }

        let outcome = ArenaOutcome {
            final_score: self.session.score(),
            final_rank,
            prize: self.tournament.prize_for(self.real).map(str::to_string),
            challenges_completed: self.session.stats().correct,
        };
        info!(
            tournament = %self.tournament.id(),
            score = outcome.final_score,
            rank = outcome.final_rank,
            "arena finished"
        );
        self.outcome = Some(outcome);
    }
}
