//! Reconciles a player's guess with the subject or filmography on screen.
//!
//! Two lookups (search by title, filmography by person) can return
//! differently shaped records for the same film, so filmography matching
//! falls back from id equality to normalized names plus release year.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::filmography::FilmographyEntry;
use crate::provider::{Candidate, Movie, MovieId};

/// How a guess was reconciled with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Provider ids are equal.
    Exact,
    /// Same year and at least one shared normalized name.
    Fuzzy,
}

/// Canonical key for a title: lowercase, alphanumeric characters only.
///
/// Lowercasing follows Unicode case mapping, independent of locale.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical release year; non-positive years count as unknown.
pub fn normalize_year(year: Option<i32>) -> Option<i32> {
    year.filter(|y| *y > 0)
}

/// Returns `true` if the guess names the cast-reveal subject.
///
/// Cast mode only trusts ids: guesses come from the same index as subjects.
#[instrument(skip(guess, subject), fields(guess_id = *guess.id(), subject_id = *subject.id()))]
pub fn matches_subject(guess: &Candidate, subject: &Movie) -> bool {
    guess.id() == subject.id()
}

/// Finds the filmography entry a guess refers to.
///
/// When several entries share a name and year with the guess, the first one
/// not in `solved` wins; a solved entry is returned only if all are solved.
#[instrument(skip(guess, entries, solved), fields(guess_id = *guess.id(), entries = entries.len()))]
pub fn resolve_entry<'a>(
    guess: &Candidate,
    entries: &'a [FilmographyEntry],
    solved: &[MovieId],
) -> Option<(&'a FilmographyEntry, MatchKind)> {
    if let Some(entry) = entries.iter().find(|e| e.id() == guess.id()) {
        debug!(entry_id = *entry.id(), "Exact id match");
        return Some((entry, MatchKind::Exact));
    }

    let year = normalize_year(*guess.release_year())?;
    let guess_names = name_set(
        std::iter::once(guess.title().as_str()).chain(guess.original_title().as_deref()),
    );
    if guess_names.is_empty() {
        return None;
    }

    let mut matching = entries.iter().filter(|entry| {
        normalize_year(Some(*entry.year())) == Some(year)
            && !guess_names.is_disjoint(&entry.name_keys())
    });
    let first = matching.next()?;
    let found = if solved.contains(first.id()) {
        matching
            .find(|entry| !solved.contains(entry.id()))
            .unwrap_or(first)
    } else {
        first
    };
    debug!(entry_id = *found.id(), "Fuzzy title match");
    Some((found, MatchKind::Fuzzy))
}

/// Normalized, non-empty keys for a set of names.
pub(crate) fn name_set<'a>(names: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    names
        .into_iter()
        .map(normalize_title)
        .filter(|key| !key.is_empty())
        .collect()
}
