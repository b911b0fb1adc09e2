//! Records exchanged with the content provider.

use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Provider id of a movie.
pub type MovieId = u64;

/// Provider id of a person.
pub type PersonId = u64;

/// Curated pool a cast-reveal session draws its subjects from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// Current crowd favourites.
    #[default]
    Popular,
    /// Films released before 1980.
    Classics,
    /// Films released from 2010 on.
    Modern,
    /// Cult favourites.
    Cult,
}

/// A credited cast member of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct CastMember {
    /// Person id.
    id: PersonId,
    /// Display name.
    name: String,
    /// Character played, if credited.
    #[serde(default)]
    character: Option<String>,
    /// Profile photo reference.
    #[serde(default)]
    photo: Option<String>,
    /// Billing order, lower is billed higher.
    #[serde(default)]
    order: u32,
}

impl CastMember {
    /// Returns `true` if this member can be shown as a photo clue.
    pub fn has_photo(&self) -> bool {
        self.photo.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

/// A movie, the subject of a cast-reveal round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Movie {
    /// Provider id.
    id: MovieId,
    /// Localized title.
    title: String,
    /// Title in the original language.
    #[serde(default)]
    original_title: Option<String>,
    /// Release year.
    #[serde(default)]
    release_year: Option<i32>,
    /// Poster reference.
    #[serde(default)]
    poster: Option<String>,
    /// Cast ordered by billing.
    #[serde(default)]
    cast: Vec<CastMember>,
}

impl Movie {
    /// Creates a movie with no cast attached.
    #[instrument(skip(title), fields(title = %title))]
    pub fn new(id: MovieId, title: String, release_year: Option<i32>) -> Self {
        Self {
            id,
            title,
            original_title: None,
            release_year,
            poster: None,
            cast: Vec::new(),
        }
    }

    /// Sets the original title.
    pub fn with_original_title(mut self, original_title: impl Into<String>) -> Self {
        self.original_title = Some(original_title.into());
        self
    }

    /// Replaces the cast, sorting it by billing order.
    pub fn with_cast(mut self, mut cast: Vec<CastMember>) -> Self {
        cast.sort_by_key(|member| member.order);
        self.cast = cast;
        self
    }

    /// Cast members that carry a photo, in billing order.
    #[instrument(skip(self), fields(movie_id = self.id))]
    pub fn photo_cast(&self) -> Vec<&CastMember> {
        self.cast.iter().filter(|m| m.has_photo()).collect()
    }
}

/// An actor, the subject of a filmography round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct Person {
    /// Provider id.
    id: PersonId,
    /// Display name.
    name: String,
    /// Provider popularity score.
    #[serde(default)]
    popularity: f64,
    /// Profile photo reference.
    #[serde(default)]
    photo: Option<String>,
}

/// One acting credit as returned by a person's filmography lookup.
///
/// Fields are optional because the provider returns sparse records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCredit {
    /// Movie id.
    pub id: MovieId,
    /// Localized title.
    #[serde(default)]
    pub title: Option<String>,
    /// Title in the original language.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Other known titles.
    #[serde(default)]
    pub alternate_titles: Vec<String>,
    /// Theatrical release date.
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Genre ids, primary first.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Character played.
    #[serde(default)]
    pub character: Option<String>,
    /// Poster reference.
    #[serde(default)]
    pub poster: Option<String>,
    /// Provider popularity score.
    #[serde(default)]
    pub popularity: f64,
}

/// A guess as the UI hands it over: a search result the player picked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
pub struct Candidate {
    /// Provider id of the picked record.
    id: MovieId,
    /// Title as shown in search results.
    title: String,
    /// Original-language title, if the search record had one.
    original_title: Option<String>,
    /// Release year, if known.
    release_year: Option<i32>,
}

impl From<&Movie> for Candidate {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            original_title: movie.original_title.clone(),
            release_year: movie.release_year,
        }
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.release_year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// Maps a primary genre id to its display name.
#[instrument]
pub fn genre_name(genre_id: u32) -> &'static str {
    match genre_id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Science Fiction",
        10770 => "TV Movie",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_game_mode_parses_lowercase() {
        assert_eq!(GameMode::from_str("classics").unwrap(), GameMode::Classics);
        assert_eq!(GameMode::Modern.to_string(), "modern");
    }

    #[test]
    fn test_blank_photo_is_not_a_clue() {
        let blank = CastMember::new(1, "A".into(), None, Some("  ".into()), 0);
        let real = CastMember::new(2, "B".into(), None, Some("/b.jpg".into()), 1);
        assert!(!blank.has_photo());
        assert!(real.has_photo());
    }

    #[test]
    fn test_with_cast_sorts_by_billing() {
        let movie = Movie::new(1, "Heat".into(), Some(1995)).with_cast(vec![
            CastMember::new(2, "Second".into(), None, Some("/2.jpg".into()), 2),
            CastMember::new(1, "First".into(), None, Some("/1.jpg".into()), 0),
        ]);
        let names: Vec<_> = movie.cast().iter().map(|m| m.name().as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[test]
    fn test_unknown_genre() {
        assert_eq!(genre_name(18), "Drama");
        assert_eq!(genre_name(4242), "Unknown");
    }
}
