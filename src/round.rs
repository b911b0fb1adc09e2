//! Round results and the bounded history they are kept in.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::provider::{GameMode, MovieId, PersonId};

/// What a round was built around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SubjectRef {
    /// A movie guessed from its cast.
    Movie {
        /// Movie id.
        id: MovieId,
        /// Title.
        title: String,
    },
    /// An actor whose films were named.
    Person {
        /// Person id.
        id: PersonId,
        /// Display name.
        name: String,
    },
}

/// Which game produced a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Cast reveal, drawn from a mode's pool.
    CastReveal(GameMode),
    /// Filmography naming.
    Filmography,
}

impl std::fmt::Display for PlayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayMode::CastReveal(mode) => write!(f, "cast-reveal/{}", mode),
            PlayMode::Filmography => write!(f, "filmography"),
        }
    }
}

/// Record of one completed round. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RoundResult {
    subject: SubjectRef,
    is_correct: bool,
    guess_count: u32,
    clues_revealed: u32,
    wrong_guesses: Vec<String>,
    completed_at: DateTime<Utc>,
    mode: PlayMode,
    language: String,
}

impl RoundResult {
    /// Creates a round result.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(subject, wrong_guesses, language), fields(subject = ?subject))]
    pub fn new(
        subject: SubjectRef,
        is_correct: bool,
        guess_count: u32,
        clues_revealed: u32,
        wrong_guesses: Vec<String>,
        completed_at: DateTime<Utc>,
        mode: PlayMode,
        language: String,
    ) -> Self {
        Self {
            subject,
            is_correct,
            guess_count,
            clues_revealed,
            wrong_guesses,
            completed_at,
            mode,
            language,
        }
    }
}

/// Past round results, oldest first, capped at a fixed length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHistory {
    limit: usize,
    results: VecDeque<RoundResult>,
}

impl RoundHistory {
    /// Creates an empty history keeping at most `limit` results.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            results: VecDeque::new(),
        }
    }

    /// Appends a result, dropping the oldest once over the limit.
    #[instrument(skip(self, result), fields(limit = self.limit))]
    pub fn push(&mut self, result: RoundResult) {
        if self.limit == 0 {
            return;
        }
        while self.results.len() >= self.limit {
            self.results.pop_front();
            debug!("Dropped oldest round result");
        }
        self.results.push_back(result);
    }

    /// Iterates results, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &RoundResult> {
        self.results.iter()
    }

    /// Most recent result.
    pub fn last(&self) -> Option<&RoundResult> {
        self.results.back()
    }

    /// Number of results held.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if no results are held.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: MovieId) -> RoundResult {
        RoundResult::new(
            SubjectRef::Movie {
                id,
                title: format!("Movie {}", id),
            },
            true,
            1,
            1,
            Vec::new(),
            Utc::now(),
            PlayMode::CastReveal(GameMode::Popular),
            "en-US".to_string(),
        )
    }

    #[test]
    fn test_history_drops_oldest() {
        let mut history = RoundHistory::new(2);
        history.push(result(1));
        history.push(result(2));
        history.push(result(3));

        let ids: Vec<_> = history
            .iter()
            .map(|r| match r.subject() {
                SubjectRef::Movie { id, .. } => *id,
                SubjectRef::Person { id, .. } => *id,
            })
            .collect();
        assert_eq!(ids, [2, 3]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = RoundHistory::new(0);
        history.push(result(1));
        assert!(history.is_empty());
    }

    #[test]
    fn test_play_mode_display() {
        assert_eq!(
            PlayMode::CastReveal(GameMode::Classics).to_string(),
            "cast-reveal/classics"
        );
        assert_eq!(PlayMode::Filmography.to_string(), "filmography");
    }
}
