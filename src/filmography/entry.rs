//! Filmography entries and the dedup pass that builds them from raw credits.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::matcher::{name_set, normalize_title};
use crate::provider::{MovieId, RawCredit, genre_name};

/// One film the player has to name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct FilmographyEntry {
    /// Movie id.
    id: MovieId,
    /// Localized title.
    title: String,
    /// Original-language title.
    original_title: Option<String>,
    /// Other known titles.
    alternate_titles: Vec<String>,
    /// Release year.
    year: i32,
    /// Primary genre name.
    genre: String,
    /// Character played.
    character: Option<String>,
    /// Poster reference.
    poster: Option<String>,
    /// Provider popularity score.
    popularity: f64,
}

impl FilmographyEntry {
    /// Creates an entry with only the identifying fields set.
    pub fn new(id: MovieId, title: String, year: i32) -> Self {
        Self {
            id,
            title,
            original_title: None,
            alternate_titles: Vec::new(),
            year,
            genre: genre_name(0).to_string(),
            character: None,
            poster: None,
            popularity: 0.0,
        }
    }

    /// Sets the original title.
    pub fn with_original_title(mut self, original_title: impl Into<String>) -> Self {
        self.original_title = Some(original_title.into());
        self
    }

    /// Sets the alternate titles.
    pub fn with_alternate_titles(mut self, alternate_titles: Vec<String>) -> Self {
        self.alternate_titles = alternate_titles;
        self
    }

    /// Normalized title, original title and alternate titles.
    pub fn name_keys(&self) -> HashSet<String> {
        name_set(
            std::iter::once(self.title.as_str())
                .chain(self.original_title.as_deref())
                .chain(self.alternate_titles.iter().map(String::as_str)),
        )
    }

    #[instrument(skip(credit), fields(credit_id = credit.id))]
    fn from_credit(credit: &RawCredit, title: String, year: i32) -> Self {
        Self {
            id: credit.id,
            title,
            original_title: credit.original_title.clone(),
            alternate_titles: credit.alternate_titles.clone(),
            year,
            genre: genre_name(credit.genre_ids.first().copied().unwrap_or(0)).to_string(),
            character: credit.character.clone().filter(|c| !c.trim().is_empty()),
            poster: credit.poster.clone(),
            popularity: credit.popularity,
        }
    }
}

/// Builds the deduplicated filmography for a person.
///
/// Credits without a title or release date, or released after `today`, are
/// dropped. Credits sharing a normalized title and release year collapse to
/// the earliest release; ties keep the lowest id. Entries come back in
/// release order.
#[instrument(skip(credits), fields(credits = credits.len()))]
pub fn build_filmography(credits: &[RawCredit], today: NaiveDate) -> Vec<FilmographyEntry> {
    let mut dated: Vec<(&RawCredit, NaiveDate, String)> = credits
        .iter()
        .filter_map(|credit| {
            let date = credit.release_date.filter(|date| *date <= today)?;
            let title = credit
                .title
                .as_deref()
                .or(credit.original_title.as_deref())
                .map(str::trim)
                .filter(|t| !t.is_empty())?;
            Some((credit, date, title.to_string()))
        })
        .collect();
    dated.sort_by(|(a, a_date, _), (b, b_date, _)| a_date.cmp(b_date).then(a.id.cmp(&b.id)));

    let mut seen: HashMap<(String, i32), MovieId> = HashMap::new();
    let mut entries = Vec::with_capacity(dated.len());
    for (credit, date, title) in dated {
        let key = (normalize_title(&title), date.year());
        if key.0.is_empty() {
            continue;
        }
        if let Some(kept) = seen.get(&key) {
            debug!(credit_id = credit.id, kept_id = *kept, "Dropping duplicate credit");
            continue;
        }
        seen.insert(key, credit.id);
        entries.push(FilmographyEntry::from_credit(credit, title, date.year()));
    }

    info!(
        credits = credits.len(),
        entries = entries.len(),
        "Filmography built"
    );
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn credit(id: MovieId, title: &str, released: Option<NaiveDate>) -> RawCredit {
        RawCredit {
            id,
            title: Some(title.to_string()),
            release_date: released,
            genre_ids: vec![18, 28],
            ..RawCredit::default()
        }
    }

    #[test]
    fn test_duplicates_collapse_to_one_entry() {
        let credits = vec![
            credit(10, "Movie A", Some(date(2001, 5, 1))),
            credit(11, "movie a.", Some(date(2001, 9, 1))),
        ];
        let entries = build_filmography(&credits, date(2024, 1, 1));
        assert_eq!(entries.len(), 1);
        assert_eq!(*entries[0].id(), 10);
        assert_eq!(entries[0].genre(), "Drama");
    }

    #[test]
    fn test_same_title_different_year_is_kept() {
        let credits = vec![
            credit(1, "Dune", Some(date(1984, 12, 14))),
            credit(2, "Dune", Some(date(2021, 10, 22))),
        ];
        assert_eq!(build_filmography(&credits, date(2024, 1, 1)).len(), 2);
    }

    #[test]
    fn test_future_and_dateless_credits_are_excluded() {
        let credits = vec![
            credit(1, "Released", Some(date(2020, 1, 1))),
            credit(2, "Upcoming", Some(date(2030, 1, 1))),
            credit(3, "Rumoured", None),
        ];
        let entries = build_filmography(&credits, date(2024, 1, 1));
        let ids: Vec<_> = entries.iter().map(|e| *e.id()).collect();
        assert_eq!(ids, [1]);
    }

    #[test]
    fn test_release_on_today_is_included() {
        let credits = vec![credit(1, "Premiere", Some(date(2024, 1, 1)))];
        assert_eq!(build_filmography(&credits, date(2024, 1, 1)).len(), 1);
    }

    #[test]
    fn test_entries_are_in_release_order() {
        let credits = vec![
            credit(3, "Late", Some(date(2015, 1, 1))),
            credit(1, "Early", Some(date(1999, 1, 1))),
        ];
        let entries = build_filmography(&credits, date(2024, 1, 1));
        let titles: Vec<_> = entries.iter().map(|e| e.title().as_str()).collect();
        assert_eq!(titles, ["Early", "Late"]);
    }

    #[test]
    fn test_untitled_credit_falls_back_to_original_title() {
        let credits = vec![RawCredit {
            id: 4,
            original_title: Some("Ringu".into()),
            release_date: Some(date(1998, 1, 31)),
            ..RawCredit::default()
        }];
        let entries = build_filmography(&credits, date(2024, 1, 1));
        assert_eq!(entries[0].title(), "Ringu");
        assert_eq!(entries[0].genre(), "Unknown");
    }
}
