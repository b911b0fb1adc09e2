//! Random subject selection over a working pool.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use crate::provider::{CastMember, Movie, MovieId};

/// Draws subjects uniformly from the not-yet-used part of a pool.
///
/// Drawn candidates leave the working pool whether or not they qualify;
/// accepted ones are remembered so a refill does not serve them again.
#[derive(Debug, Clone)]
pub struct SubjectPicker {
    pool: Vec<Movie>,
    used: HashSet<MovieId>,
    rng: StdRng,
    min_photo_cast: usize,
}

impl SubjectPicker {
    /// Creates an empty picker. A seed makes draws reproducible.
    #[instrument]
    pub fn new(min_photo_cast: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            pool: Vec::new(),
            used: HashSet::new(),
            rng,
            min_photo_cast,
        }
    }

    /// Replaces the working pool with fresh candidates, minus used subjects.
    ///
    /// When every candidate has been used already, the used set is cleared
    /// and the whole pool becomes eligible again.
    #[instrument(skip(self, pool), fields(candidates = pool.len(), used = self.used.len()))]
    pub fn refill(&mut self, pool: Vec<Movie>) {
        let mut seen = HashSet::new();
        let unique: Vec<Movie> = pool.into_iter().filter(|m| seen.insert(*m.id())).collect();

        if unique.iter().all(|m| self.used.contains(m.id())) {
            debug!("Every candidate already used, starting a new cycle");
            self.used.clear();
        }
        self.pool = unique
            .into_iter()
            .filter(|m| !self.used.contains(m.id()))
            .collect();
        info!(eligible = self.pool.len(), "Working pool refilled");
    }

    /// Removes and returns a uniformly random candidate.
    #[instrument(skip(self), fields(remaining = self.pool.len()))]
    pub fn draw(&mut self) -> Option<Movie> {
        if self.pool.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.pool.len());
        Some(self.pool.swap_remove(index))
    }

    /// Attaches the photo-bearing cast if there is enough of it.
    ///
    /// A subject always needs at least one photo, whatever the minimum.
    #[instrument(skip(self, candidate, cast), fields(movie_id = *candidate.id(), cast = cast.len()))]
    pub fn qualify(&self, candidate: Movie, cast: Vec<CastMember>) -> Option<Movie> {
        let movie = candidate.with_cast(cast);
        let photo_cast: Vec<CastMember> = movie.photo_cast().into_iter().cloned().collect();
        let required = self.min_photo_cast.max(1);
        if photo_cast.len() < required {
            debug!(
                with_photos = photo_cast.len(),
                required,
                "Candidate lacks cast photos"
            );
            return None;
        }
        Some(movie.with_cast(photo_cast))
    }

    /// Marks a subject as served.
    #[instrument(skip(self))]
    pub fn mark_used(&mut self, movie_id: MovieId) {
        self.used.insert(movie_id);
    }

    /// Candidates left in the working pool.
    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    /// Forgets the pool and every used subject.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.pool.clear();
        self.used.clear();
    }
}
