//! In-memory content provider backed by a JSON catalog file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{CastMember, Candidate, ContentProvider, GameMode, Movie, MovieId, Person, PersonId, RawCredit};
use crate::ProviderError;
use crate::matcher::normalize_title;

/// A catalog movie together with the modes whose pools it belongs to.
///
/// A movie with no modes belongs to every pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMovie {
    /// The movie, cast included.
    #[serde(flatten)]
    pub movie: Movie,
    /// Pools this movie is part of.
    #[serde(default)]
    pub modes: Vec<GameMode>,
}

/// A self-contained movie catalog.
///
/// Language arguments are accepted and ignored; a catalog holds one language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    movies: Vec<CatalogMovie>,
    #[serde(default)]
    people: Vec<Person>,
    #[serde(default)]
    filmographies: HashMap<PersonId, Vec<RawCredit>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a catalog from a JSON file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        debug!("Loading catalog from file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let catalog: Self = serde_json::from_str(&content)?;
        info!(
            movies = catalog.movies.len(),
            people = catalog.people.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Adds a movie to the given pools.
    pub fn with_movie(mut self, movie: Movie, modes: Vec<GameMode>) -> Self {
        self.movies.push(CatalogMovie { movie, modes });
        self
    }

    /// Adds a person with their raw credits.
    pub fn with_person(mut self, person: Person, credits: Vec<RawCredit>) -> Self {
        self.filmographies.insert(*person.id(), credits);
        self.people.push(person);
        self
    }

    /// Returns every person in the catalog.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Looks up a person by id.
    #[instrument(skip(self))]
    pub fn person(&self, person_id: PersonId) -> Option<&Person> {
        self.people.iter().find(|p| *p.id() == person_id)
    }

    fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movies
            .iter()
            .map(|entry| &entry.movie)
            .find(|movie| *movie.id() == movie_id)
    }
}

#[async_trait::async_trait]
impl ContentProvider for Catalog {
    #[instrument(skip(self))]
    async fn search_subjects(
        &self,
        query: &str,
        _language: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let needle = normalize_title(query);
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(bool, &Movie)> = self
            .movies
            .iter()
            .map(|entry| &entry.movie)
            .filter_map(|movie| {
                let names = std::iter::once(movie.title().as_str())
                    .chain(movie.original_title().as_deref())
                    .map(normalize_title)
                    .collect::<Vec<_>>();
                let exact = names.iter().any(|n| *n == needle);
                names
                    .iter()
                    .any(|n| n.contains(&needle))
                    .then_some((exact, movie))
            })
            .collect();

        // Exact title hits first, then by title for a stable ranking.
        hits.sort_by(|(a_exact, a), (b_exact, b)| {
            b_exact.cmp(a_exact).then_with(|| a.title().cmp(b.title()))
        });

        debug!(hits = hits.len(), "Search complete");
        Ok(hits.into_iter().map(|(_, movie)| Candidate::from(movie)).collect())
    }

    #[instrument(skip(self))]
    async fn pool_for_mode(
        &self,
        mode: GameMode,
        _language: &str,
    ) -> Result<Vec<Movie>, ProviderError> {
        let pool: Vec<Movie> = self
            .movies
            .iter()
            .filter(|entry| entry.modes.is_empty() || entry.modes.contains(&mode))
            .map(|entry| entry.movie.clone())
            .collect();
        debug!(size = pool.len(), "Pool assembled");
        Ok(pool)
    }

    #[instrument(skip(self))]
    async fn credits(
        &self,
        movie_id: MovieId,
        _language: &str,
    ) -> Result<Vec<CastMember>, ProviderError> {
        match self.movie(movie_id) {
            Some(movie) => Ok(movie.cast().clone()),
            None => {
                warn!(movie_id, "Credits requested for unknown movie");
                Err(ProviderError::new(format!("Unknown movie {}", movie_id)))
            }
        }
    }

    #[instrument(skip(self))]
    async fn person_filmography(
        &self,
        person_id: PersonId,
        _language: &str,
    ) -> Result<Vec<RawCredit>, ProviderError> {
        match self.filmographies.get(&person_id) {
            Some(credits) => Ok(credits.clone()),
            None => {
                warn!(person_id, "Filmography requested for unknown person");
                Err(ProviderError::new(format!("Unknown person {}", person_id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new()
            .with_movie(Movie::new(1, "Alien".into(), Some(1979)), vec![GameMode::Classics])
            .with_movie(Movie::new(2, "Aliens".into(), Some(1986)), vec![])
            .with_movie(
                Movie::new(3, "Spirited Away".into(), Some(2001))
                    .with_original_title("Sen to Chihiro no Kamikakushi"),
                vec![GameMode::Popular],
            )
    }

    #[tokio::test]
    async fn test_search_ranks_exact_title_first() {
        let hits = catalog().search_subjects("ALIEN", "en-US").await.unwrap();
        let ids: Vec<_> = hits.iter().map(|c| *c.id()).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[tokio::test]
    async fn test_search_matches_original_title() {
        let hits = catalog().search_subjects("chihiro", "en-US").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(*hits[0].id(), 3);
    }

    #[tokio::test]
    async fn test_untagged_movies_join_every_pool() {
        let pool = catalog().pool_for_mode(GameMode::Cult, "en-US").await.unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(*pool[0].id(), 2);

        let pool = catalog().pool_for_mode(GameMode::Classics, "en-US").await.unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_fail() {
        assert!(catalog().credits(99, "en-US").await.is_err());
        assert!(catalog().person_filmography(99, "en-US").await.is_err());
    }
}
