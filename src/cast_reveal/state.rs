//! Cast-reveal round state and its reducer.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

use crate::matcher::matches_subject;
use crate::provider::{CastMember, Candidate, GameMode, Movie};
use crate::round::{PlayMode, RoundHistory, RoundResult, SubjectRef};
use crate::session::{Reducer, Transition};

/// Where the session stands in its current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum RoundPhase {
    /// Waiting for a subject; the initial phase.
    Loading,
    /// A subject is on screen and accepting guesses.
    InRound,
    /// The subject was named.
    Won,
    /// The budget ran out or the player forfeited.
    Lost,
}

/// Why a round was forfeited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Forfeit {
    /// Move on to the next subject right away.
    Skip,
    /// Reveal the answer and wait for "play again".
    GiveUp,
}

/// Input to the cast-reveal reducer.
#[derive(Debug, Clone)]
pub enum CastAction {
    /// The candidate pool could not be loaded.
    PoolFailed {
        /// User-facing reason.
        message: String,
    },
    /// A new subject was selected; its cast holds only photo clues.
    StartRound {
        /// The subject.
        subject: Movie,
    },
    /// The player picked a candidate.
    Guess {
        /// The picked candidate.
        candidate: Candidate,
        /// When the guess was made.
        at: DateTime<Utc>,
    },
    /// The player asked for one more cast member.
    RevealNext,
    /// The player abandoned the round.
    Forfeit {
        /// Skip or give up.
        reason: Forfeit,
        /// When the round was abandoned.
        at: DateTime<Utc>,
    },
}

/// Typed answer to a cast-reveal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOutcome {
    /// The session is still without a subject.
    Idle,
    /// A round started with this many clues showing.
    RoundStarted {
        /// Clues showing.
        revealed: u32,
    },
    /// A round is already in flight; the new subject was refused.
    RoundInProgress,
    /// The guess named the subject.
    Correct,
    /// The guess missed and another clue was revealed.
    Wrong {
        /// Clues now showing.
        revealed: u32,
    },
    /// The guess missed with the budget exhausted.
    Lost,
    /// A clue was revealed on request.
    Revealed {
        /// Clues now showing.
        revealed: u32,
    },
    /// Every clue in the budget is already showing.
    AtBudget,
    /// The round was abandoned and recorded as a loss.
    Forfeited(Forfeit),
    /// The round already ended; the action was ignored.
    RoundOver,
    /// No round has started; the action was ignored.
    NoRound,
}

/// Snapshot of a cast-reveal session.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct CastRevealState {
    /// Current phase.
    phase: RoundPhase,
    /// Subject of the current or last round.
    subject: Option<Movie>,
    /// Clues showing in the current round.
    revealed: u32,
    /// Guesses made in the current round.
    guess_count: u32,
    /// Wrong guesses in the current round, in order.
    wrong_guesses: Vec<Candidate>,
    /// Set once the round ends.
    is_correct: Option<bool>,
    /// Rounds won this session.
    score: u32,
    /// Guesses and manual reveals this session.
    attempts: u32,
    /// Rounds finished this session.
    rounds_played: u32,
    /// Completed rounds, oldest first.
    history: RoundHistory,
    /// Maximum clues per round.
    reveal_budget: u32,
    /// Pool mode.
    mode: GameMode,
    /// Content language.
    language: String,
    /// Last user-facing failure.
    error: Option<String>,
}

impl CastRevealState {
    /// Creates an idle session.
    #[instrument]
    pub fn new(reveal_budget: u32, history_limit: usize, mode: GameMode, language: String) -> Self {
        Self {
            phase: RoundPhase::Loading,
            subject: None,
            revealed: 0,
            guess_count: 0,
            wrong_guesses: Vec::new(),
            is_correct: None,
            score: 0,
            attempts: 0,
            rounds_played: 0,
            history: RoundHistory::new(history_limit),
            reveal_budget: reveal_budget.max(1),
            mode,
            language,
            error: None,
        }
    }

    /// Cast members currently showing, in billing order.
    pub fn revealed_cast(&self) -> &[CastMember] {
        match &self.subject {
            Some(subject) => {
                let shown = (self.revealed as usize).min(subject.cast().len());
                &subject.cast()[..shown]
            }
            None => &[],
        }
    }

    /// Returns `true` while the round accepts guesses.
    pub fn is_in_round(&self) -> bool {
        self.phase == RoundPhase::InRound
    }

    /// Returns `true` once the current round has ended.
    pub fn is_round_complete(&self) -> bool {
        matches!(self.phase, RoundPhase::Won | RoundPhase::Lost)
    }

    /// Clue cap for the current subject: the budget, or fewer if the cast is short.
    pub fn effective_budget(&self) -> u32 {
        let cast = self
            .subject
            .as_ref()
            .map_or(0, |s| u32::try_from(s.cast().len()).unwrap_or(u32::MAX));
        self.reveal_budget.min(cast).max(1)
    }

    fn stale_outcome(&self) -> CastOutcome {
        if self.is_round_complete() {
            CastOutcome::RoundOver
        } else {
            CastOutcome::NoRound
        }
    }

    fn finish(mut self, is_correct: bool, at: DateTime<Utc>) -> (Self, RoundResult) {
        self.phase = if is_correct {
            RoundPhase::Won
        } else {
            RoundPhase::Lost
        };
        self.is_correct = Some(is_correct);
        self.rounds_played += 1;
        if is_correct {
            self.score += 1;
        }

        let subject = match &self.subject {
            Some(movie) => SubjectRef::Movie {
                id: *movie.id(),
                title: movie.title().clone(),
            },
            None => SubjectRef::Movie {
                id: 0,
                title: String::new(),
            },
        };
        let result = RoundResult::new(
            subject,
            is_correct,
            self.guess_count,
            self.revealed,
            self.wrong_guesses.iter().map(ToString::to_string).collect(),
            at,
            PlayMode::CastReveal(self.mode),
            self.language.clone(),
        );
        self.history.push(result.clone());
        info!(
            is_correct,
            guesses = self.guess_count,
            revealed = self.revealed,
            score = self.score,
            "Round complete"
        );
        (self, result)
    }

    fn start_round(&self, subject: Movie) -> Transition<Self, CastOutcome> {
        if self.is_in_round() {
            warn!(subject_id = *subject.id(), "Refusing new subject while a round is in flight");
            return Transition::unchanged(self.clone(), CastOutcome::RoundInProgress);
        }

        let mut next = self.clone();
        info!(subject_id = *subject.id(), cast = subject.cast().len(), "Round started");
        next.subject = Some(subject);
        next.phase = RoundPhase::InRound;
        next.revealed = 1;
        next.guess_count = 0;
        next.wrong_guesses.clear();
        next.is_correct = None;
        next.error = None;
        Transition::next(next, CastOutcome::RoundStarted { revealed: 1 })
    }

    fn take_guess(&self, candidate: Candidate, at: DateTime<Utc>) -> Transition<Self, CastOutcome> {
        let Some(subject) = self.subject.as_ref().filter(|_| self.is_in_round()) else {
            debug!(phase = %self.phase, "Guess outside a round");
            return Transition::unchanged(self.clone(), self.stale_outcome());
        };
        let hit = matches_subject(&candidate, subject);

        let mut next = self.clone();
        next.guess_count += 1;
        next.attempts += 1;

        if hit {
            let (next, result) = next.finish(true, at);
            return Transition::completing(next, CastOutcome::Correct, result);
        }

        debug!(guess = %candidate, "Wrong guess");
        next.wrong_guesses.push(candidate);
        if next.revealed < next.effective_budget() {
            next.revealed += 1;
            let revealed = next.revealed;
            Transition::next(next, CastOutcome::Wrong { revealed })
        } else {
            let (next, result) = next.finish(false, at);
            Transition::completing(next, CastOutcome::Lost, result)
        }
    }

    fn reveal_next(&self) -> Transition<Self, CastOutcome> {
        if !self.is_in_round() {
            return Transition::unchanged(self.clone(), self.stale_outcome());
        }
        if self.revealed >= self.effective_budget() {
            return Transition::unchanged(self.clone(), CastOutcome::AtBudget);
        }

        let mut next = self.clone();
        next.revealed += 1;
        next.attempts += 1;
        let revealed = next.revealed;
        Transition::next(next, CastOutcome::Revealed { revealed })
    }

    fn forfeit(&self, reason: Forfeit, at: DateTime<Utc>) -> Transition<Self, CastOutcome> {
        if !self.is_in_round() {
            return Transition::unchanged(self.clone(), self.stale_outcome());
        }
        info!(%reason, "Round forfeited");
        let (next, result) = self.clone().finish(false, at);
        Transition::completing(next, CastOutcome::Forfeited(reason), result)
    }
}

impl Reducer for CastRevealState {
    type Action = CastAction;
    type Outcome = CastOutcome;

    fn reduce(&self, action: CastAction) -> Transition<Self, CastOutcome> {
        match action {
            CastAction::PoolFailed { message } => {
                let mut next = self.clone();
                if !next.is_in_round() {
                    next.phase = RoundPhase::Loading;
                    next.subject = None;
                }
                next.error = Some(message);
                Transition::next(next, CastOutcome::Idle)
            }
            CastAction::StartRound { subject } => self.start_round(subject),
            CastAction::Guess { candidate, at } => self.take_guess(candidate, at),
            CastAction::RevealNext => self.reveal_next(),
            CastAction::Forfeit { reason, at } => self.forfeit(reason, at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: u64, cast: usize) -> Movie {
        let members = (0..cast)
            .map(|i| {
                CastMember::new(
                    100 + i as u64,
                    format!("Actor {}", i),
                    None,
                    Some(format!("/{}.jpg", i)),
                    i as u32,
                )
            })
            .collect();
        Movie::new(id, format!("Movie {}", id), Some(2000)).with_cast(members)
    }

    fn wrong() -> Candidate {
        Candidate::new(1, "Nope".into(), None, Some(1990))
    }

    fn started(budget: u32) -> CastRevealState {
        let state = CastRevealState::new(budget, 10, GameMode::Popular, "en-US".into());
        state
            .reduce(CastAction::StartRound { subject: subject(42, 8) })
            .into_parts()
            .0
    }

    #[test]
    fn test_round_starts_with_one_clue() {
        let state = started(6);
        assert_eq!(state.phase(), &RoundPhase::InRound);
        assert_eq!(*state.revealed(), 1);
        assert_eq!(state.revealed_cast().len(), 1);
    }

    #[test]
    fn test_wrong_guesses_reveal_then_lose() {
        let mut state = started(6);
        for expected in 2..=6 {
            let (next, outcome, completed) = state
                .reduce(CastAction::Guess { candidate: wrong(), at: Utc::now() })
                .into_parts();
            assert_eq!(outcome, CastOutcome::Wrong { revealed: expected });
            assert_eq!(next.phase(), &RoundPhase::InRound);
            assert!(completed.is_none());
            state = next;
        }

        let (state, outcome, completed) = state
            .reduce(CastAction::Guess { candidate: wrong(), at: Utc::now() })
            .into_parts();
        assert_eq!(outcome, CastOutcome::Lost);
        assert_eq!(state.phase(), &RoundPhase::Lost);
        let result = completed.expect("loss is recorded");
        assert_eq!(*result.clues_revealed(), 6);
        assert!(!*result.is_correct());
        assert_eq!(*result.guess_count(), 6);
        assert_eq!(result.wrong_guesses().len(), 6);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_exact_id_wins_at_any_reveal() {
        let mut state = started(6);
        for _ in 0..3 {
            state = state.reduce(CastAction::RevealNext).into_parts().0;
        }
        let hit = Candidate::new(42, "Anything".into(), None, None);
        let (state, outcome, completed) = state
            .reduce(CastAction::Guess { candidate: hit, at: Utc::now() })
            .into_parts();
        assert_eq!(outcome, CastOutcome::Correct);
        assert_eq!(*state.revealed(), 4);
        assert_eq!(*state.score(), 1);
        assert!(*completed.unwrap().is_correct());
    }

    #[test]
    fn test_manual_reveal_caps_at_budget_and_counts_attempts() {
        let mut state = started(3);
        let (next, outcome, _) = state.reduce(CastAction::RevealNext).into_parts();
        assert_eq!(outcome, CastOutcome::Revealed { revealed: 2 });
        state = next;
        state = state.reduce(CastAction::RevealNext).into_parts().0;
        let transition = state.reduce(CastAction::RevealNext);
        assert_eq!(transition.outcome(), &CastOutcome::AtBudget);
        assert!(!transition.changed());
        assert_eq!(*state.revealed(), 3);
        assert_eq!(*state.attempts(), 2);
        assert_eq!(state.phase(), &RoundPhase::InRound);
    }

    #[test]
    fn test_budget_limited_by_short_cast() {
        let state = CastRevealState::new(6, 10, GameMode::Popular, "en-US".into());
        let state = state
            .reduce(CastAction::StartRound { subject: subject(7, 2) })
            .into_parts()
            .0;
        assert_eq!(state.effective_budget(), 2);
        let state = state
            .reduce(CastAction::Guess { candidate: wrong(), at: Utc::now() })
            .into_parts()
            .0;
        let (_, outcome, _) = state
            .reduce(CastAction::Guess { candidate: wrong(), at: Utc::now() })
            .into_parts();
        assert_eq!(outcome, CastOutcome::Lost);
    }

    #[test]
    fn test_actions_after_round_are_stale() {
        let state = started(6);
        let state = state
            .reduce(CastAction::Forfeit { reason: Forfeit::GiveUp, at: Utc::now() })
            .into_parts()
            .0;
        assert_eq!(state.phase(), &RoundPhase::Lost);

        let transition = state.reduce(CastAction::Guess { candidate: wrong(), at: Utc::now() });
        assert_eq!(transition.outcome(), &CastOutcome::RoundOver);
        assert!(!transition.changed());
        assert!(transition.completed().is_none());
        assert_eq!(
            state.reduce(CastAction::RevealNext).outcome(),
            &CastOutcome::RoundOver
        );
    }

    #[test]
    fn test_guess_before_any_round() {
        let state = CastRevealState::new(6, 10, GameMode::Popular, "en-US".into());
        let transition = state.reduce(CastAction::Guess { candidate: wrong(), at: Utc::now() });
        assert_eq!(transition.outcome(), &CastOutcome::NoRound);
    }

    #[test]
    fn test_new_round_resets_round_counters_only() {
        let state = started(6);
        let state = state
            .reduce(CastAction::Guess { candidate: wrong(), at: Utc::now() })
            .into_parts()
            .0;
        let state = state
            .reduce(CastAction::Forfeit { reason: Forfeit::Skip, at: Utc::now() })
            .into_parts()
            .0;
        let state = state
            .reduce(CastAction::StartRound { subject: subject(43, 6) })
            .into_parts()
            .0;
        assert_eq!(*state.guess_count(), 0);
        assert!(state.wrong_guesses().is_empty());
        assert_eq!(*state.revealed(), 1);
        assert_eq!(*state.attempts(), 1);
        assert_eq!(*state.rounds_played(), 1);
    }

    #[test]
    fn test_start_refused_mid_round() {
        let state = started(6);
        let transition = state.reduce(CastAction::StartRound { subject: subject(9, 6) });
        assert_eq!(transition.outcome(), &CastOutcome::RoundInProgress);
        assert_eq!(*transition.state().subject().as_ref().unwrap().id(), 42);
    }

    #[test]
    fn test_pool_failure_keeps_loading_with_error() {
        let state = CastRevealState::new(6, 10, GameMode::Popular, "en-US".into());
        let state = state
            .reduce(CastAction::PoolFailed { message: "offline".into() })
            .into_parts()
            .0;
        assert_eq!(state.phase(), &RoundPhase::Loading);
        assert_eq!(state.error().as_deref(), Some("offline"));
    }
}
