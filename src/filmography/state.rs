//! Filmography round state and its reducer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

use super::FilmographyEntry;
use crate::matcher::{MatchKind, resolve_entry};
use crate::provider::{Candidate, MovieId, Person};
use crate::round::{PlayMode, RoundResult, SubjectRef};
use crate::session::{Reducer, Transition};

/// Highest hint level an entry can reach.
pub const MAX_HINT_LEVEL: u8 = 4;

/// Detail unlocked at each hint level, in reveal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
pub enum HintTier {
    /// Level 1.
    Year,
    /// Level 2.
    Genre,
    /// Level 3.
    Character,
    /// Level 4.
    Poster,
}

impl HintTier {
    /// Tiers unlocked at a given level.
    pub fn unlocked(level: u8) -> &'static [HintTier] {
        const ALL: [HintTier; 4] = [
            HintTier::Year,
            HintTier::Genre,
            HintTier::Character,
            HintTier::Poster,
        ];
        &ALL[..usize::from(level.min(MAX_HINT_LEVEL))]
    }
}

/// Where a filmography round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum FilmographyPhase {
    /// No actor selected.
    Idle,
    /// Accepting guesses; also the phase once every entry is solved.
    Running,
    /// The countdown ran out.
    TimeUp,
    /// Loading the actor failed or left no entries.
    Failed,
}

/// Input to the filmography reducer.
#[derive(Debug, Clone)]
pub enum FilmographyAction {
    /// An actor's deduplicated filmography is ready.
    Load {
        /// The actor.
        actor: Person,
        /// Entries to name.
        entries: Vec<FilmographyEntry>,
        /// Countdown length, if any.
        time_limit_secs: Option<u32>,
    },
    /// The filmography could not be fetched.
    LoadFailed {
        /// User-facing reason.
        message: String,
    },
    /// The player named a film.
    Guess {
        /// The picked candidate.
        candidate: Candidate,
        /// When the guess was made.
        at: DateTime<Utc>,
    },
    /// The player asked for one more hint on an entry.
    RevealHint {
        /// Entry to reveal more of.
        entry_id: MovieId,
    },
    /// One second of the countdown elapsed.
    Tick {
        /// When the tick fired.
        at: DateTime<Utc>,
    },
    /// Back to idle.
    Reset,
}

/// Verdict on a filmography guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuessVerdict {
    /// A new entry was solved.
    Correct {
        /// Solved entry.
        entry_id: MovieId,
        /// How the guess was matched.
        kind: MatchKind,
    },
    /// The entry was solved before; nothing changed.
    AlreadyGuessed {
        /// Previously solved entry.
        entry_id: MovieId,
    },
    /// No entry matched.
    Wrong,
    /// The countdown has run out.
    OutOfTime,
    /// No round is running.
    NotRunning,
}

/// Typed answer to a filmography action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilmographyOutcome {
    /// A round started.
    Started {
        /// Entries to name.
        total: usize,
    },
    /// The round could not start.
    Failed,
    /// A guess was judged.
    Guess(GuessVerdict),
    /// Hint level of an entry after the request.
    Hint {
        /// Entry asked about.
        entry_id: MovieId,
        /// Resulting level, 0 to 4.
        level: u8,
    },
    /// The countdown advanced.
    Ticked {
        /// Seconds left.
        remaining_secs: u32,
    },
    /// The countdown reached zero.
    TimeUp,
    /// The session went back to idle.
    Reset,
    /// The action did not apply.
    Ignored,
}

/// Snapshot of a filmography session.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct FilmographyState {
    /// Current phase.
    phase: FilmographyPhase,
    /// Actor of the round.
    actor: Option<Person>,
    /// Entries to name, in release order.
    entries: Vec<FilmographyEntry>,
    /// Solved entry ids, in solving order.
    solved: Vec<MovieId>,
    /// Guesses that matched nothing, in order.
    wrong_guesses: Vec<Candidate>,
    /// Hint level per entry; absent means 0.
    hint_levels: BTreeMap<MovieId, u8>,
    /// Countdown length.
    time_limit_secs: Option<u32>,
    /// Seconds left on the countdown.
    remaining_secs: Option<u32>,
    /// Guesses that changed the state.
    guess_count: u32,
    /// Set once the completion record has been emitted.
    completed: bool,
    /// Content language.
    language: String,
    /// Last user-facing failure.
    error: Option<String>,
}

impl FilmographyState {
    /// Creates an idle session.
    #[instrument]
    pub fn new(language: String) -> Self {
        Self {
            phase: FilmographyPhase::Idle,
            actor: None,
            entries: Vec::new(),
            solved: Vec::new(),
            wrong_guesses: Vec::new(),
            hint_levels: BTreeMap::new(),
            time_limit_secs: None,
            remaining_secs: None,
            guess_count: 0,
            completed: false,
            language,
            error: None,
        }
    }

    /// Entries in the round.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Entries solved so far.
    pub fn correct(&self) -> usize {
        self.solved.len()
    }

    /// Entries still unsolved.
    pub fn remaining(&self) -> usize {
        self.total() - self.correct()
    }

    /// Returns `true` once the countdown has run out.
    pub fn is_time_up(&self) -> bool {
        self.phase == FilmographyPhase::TimeUp
    }

    /// Returns `true` once every entry is solved.
    pub fn is_all_solved(&self) -> bool {
        !self.entries.is_empty() && self.remaining() == 0
    }

    /// Returns `true` if the entry has been solved.
    pub fn is_solved(&self, entry_id: MovieId) -> bool {
        self.solved.contains(&entry_id)
    }

    /// Hint level of an entry, 0 to 4.
    pub fn hint_level(&self, entry_id: MovieId) -> u8 {
        self.hint_levels.get(&entry_id).copied().unwrap_or(0)
    }

    /// Returns `true` while the countdown should keep running.
    pub fn needs_ticks(&self) -> bool {
        self.phase == FilmographyPhase::Running
            && self.remaining_secs.is_some()
            && !self.is_all_solved()
    }

    fn completion(&self, at: DateTime<Utc>) -> RoundResult {
        let subject = match &self.actor {
            Some(actor) => SubjectRef::Person {
                id: *actor.id(),
                name: actor.name().clone(),
            },
            None => SubjectRef::Person {
                id: 0,
                name: String::new(),
            },
        };
        let clues: u32 = self.hint_levels.values().map(|l| u32::from(*l)).sum();
        RoundResult::new(
            subject,
            self.is_all_solved(),
            self.guess_count,
            clues,
            self.wrong_guesses.iter().map(ToString::to_string).collect(),
            at,
            PlayMode::Filmography,
            self.language.clone(),
        )
    }

    fn load(
        &self,
        actor: Person,
        entries: Vec<FilmographyEntry>,
        time_limit_secs: Option<u32>,
    ) -> Transition<Self, FilmographyOutcome> {
        let mut next = Self::new(self.language.clone());
        if entries.is_empty() {
            warn!(actor_id = *actor.id(), "Actor has no eligible films");
            next.phase = FilmographyPhase::Failed;
            next.error = Some(format!("No eligible films for {}", actor.name()));
            next.actor = Some(actor);
            return Transition::next(next, FilmographyOutcome::Failed);
        }

        let total = entries.len();
        info!(actor_id = *actor.id(), total, ?time_limit_secs, "Filmography round started");
        next.phase = FilmographyPhase::Running;
        next.actor = Some(actor);
        next.entries = entries;
        next.time_limit_secs = time_limit_secs.filter(|secs| *secs > 0);
        next.remaining_secs = next.time_limit_secs;
        Transition::next(next, FilmographyOutcome::Started { total })
    }

    fn guess(&self, candidate: Candidate, at: DateTime<Utc>) -> Transition<Self, FilmographyOutcome> {
        let verdict = FilmographyOutcome::Guess;
        match self.phase {
            FilmographyPhase::TimeUp => {
                debug!("Guess after time up");
                return Transition::unchanged(self.clone(), verdict(GuessVerdict::OutOfTime));
            }
            FilmographyPhase::Idle | FilmographyPhase::Failed => {
                return Transition::unchanged(self.clone(), verdict(GuessVerdict::NotRunning));
            }
            FilmographyPhase::Running => {}
        }

        let resolved = resolve_entry(&candidate, &self.entries, &self.solved)
            .map(|(e, kind)| (*e.id(), kind));
        let mut next = self.clone();
        match resolved {
            None => {
                debug!(guess = %candidate, "Wrong guess");
                next.guess_count += 1;
                next.wrong_guesses.push(candidate);
                Transition::next(next, verdict(GuessVerdict::Wrong))
            }
            Some((entry_id, _)) if self.is_solved(entry_id) => Transition::unchanged(
                self.clone(),
                verdict(GuessVerdict::AlreadyGuessed { entry_id }),
            ),
            Some((entry_id, kind)) => {
                next.guess_count += 1;
                next.solved.push(entry_id);
                info!(entry_id, ?kind, correct = next.correct(), total = next.total(), "Entry solved");
                let outcome = verdict(GuessVerdict::Correct { entry_id, kind });
                if next.is_all_solved() && !next.completed {
                    next.completed = true;
                    let result = next.completion(at);
                    info!("Every entry solved");
                    return Transition::completing(next, outcome, result);
                }
                Transition::next(next, outcome)
            }
        }
    }

    fn reveal_hint(&self, entry_id: MovieId) -> Transition<Self, FilmographyOutcome> {
        let level = self.hint_level(entry_id);
        let unchanged = |state: &Self| {
            Transition::unchanged(state.clone(), FilmographyOutcome::Hint { entry_id, level })
        };

        if self.phase != FilmographyPhase::Running {
            debug!(phase = %self.phase, "Hint refused outside a running round");
            return unchanged(self);
        }
        if !self.entries.iter().any(|e| *e.id() == entry_id) {
            debug!(entry_id, "Hint requested for unknown entry");
            return unchanged(self);
        }
        if level >= MAX_HINT_LEVEL {
            return unchanged(self);
        }

        let mut next = self.clone();
        next.hint_levels.insert(entry_id, level + 1);
        Transition::next(
            next,
            FilmographyOutcome::Hint {
                entry_id,
                level: level + 1,
            },
        )
    }

    fn tick(&self, at: DateTime<Utc>) -> Transition<Self, FilmographyOutcome> {
        let Some(remaining) = self.remaining_secs.filter(|_| self.needs_ticks()) else {
            return Transition::unchanged(self.clone(), FilmographyOutcome::Ignored);
        };

        let mut next = self.clone();
        let remaining = remaining.saturating_sub(1);
        next.remaining_secs = Some(remaining);
        if remaining > 0 {
            return Transition::next(next, FilmographyOutcome::Ticked { remaining_secs: remaining });
        }

        info!(correct = next.correct(), total = next.total(), "Time up");
        next.phase = FilmographyPhase::TimeUp;
        if next.completed {
            return Transition::next(next, FilmographyOutcome::TimeUp);
        }
        next.completed = true;
        let result = next.completion(at);
        Transition::completing(next, FilmographyOutcome::TimeUp, result)
    }
}

impl Reducer for FilmographyState {
    type Action = FilmographyAction;
    type Outcome = FilmographyOutcome;

    fn reduce(&self, action: FilmographyAction) -> Transition<Self, FilmographyOutcome> {
        match action {
            FilmographyAction::Load {
                actor,
                entries,
                time_limit_secs,
            } => self.load(actor, entries, time_limit_secs),
            FilmographyAction::LoadFailed { message } => {
                let mut next = Self::new(self.language.clone());
                next.phase = FilmographyPhase::Failed;
                next.error = Some(message);
                Transition::next(next, FilmographyOutcome::Failed)
            }
            FilmographyAction::Guess { candidate, at } => self.guess(candidate, at),
            FilmographyAction::RevealHint { entry_id } => self.reveal_hint(entry_id),
            FilmographyAction::Tick { at } => self.tick(at),
            FilmographyAction::Reset => Transition::next(
                Self::new(self.language.clone()),
                FilmographyOutcome::Reset,
            ),
        }
    }
}
