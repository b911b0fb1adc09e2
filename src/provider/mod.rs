//! Content provider boundary: the movie database the engines draw from.

mod catalog;
mod types;

pub use catalog::{Catalog, CatalogMovie};
pub use types::{
    CastMember, Candidate, GameMode, Movie, MovieId, Person, PersonId, RawCredit, genre_name,
};

use crate::ProviderError;

/// Source of subjects, credits and filmographies.
///
/// Every call is fallible; the engines surface failures and never retry.
#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync {
    /// Searches movies by title, best match first.
    async fn search_subjects(
        &self,
        query: &str,
        language: &str,
    ) -> Result<Vec<Candidate>, ProviderError>;

    /// Returns the candidate pool for a cast-reveal mode.
    async fn pool_for_mode(
        &self,
        mode: GameMode,
        language: &str,
    ) -> Result<Vec<Movie>, ProviderError>;

    /// Returns the credited cast of a movie.
    async fn credits(
        &self,
        movie_id: MovieId,
        language: &str,
    ) -> Result<Vec<CastMember>, ProviderError>;

    /// Returns a person's raw acting credits.
    async fn person_filmography(
        &self,
        person_id: PersonId,
        language: &str,
    ) -> Result<Vec<RawCredit>, ProviderError>;
}
