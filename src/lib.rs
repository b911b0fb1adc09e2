//! Cinequiz library - session engines for a movie trivia game
//!
//! Two single-player games share one shape: pick a subject, reveal clues
//! progressively, judge guesses, record the finished round.
//!
//! # Architecture
//!
//! - **Cast reveal**: guess a movie as its cast photos appear one by one
//! - **Filmography**: name an actor's films against a countdown
//! - **Matcher**: id matching with a normalized title + year fallback
//! - **Session**: pure reducers behind a host that publishes snapshots
//! - **Provider**: the content source both engines draw from
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cinequiz::{CastRevealEngine, Catalog, GameConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_file("catalog.json")?;
//! let mut engine = CastRevealEngine::new(Arc::new(catalog), GameConfig::default());
//! engine.subscribe(|state| println!("{} clues showing", state.revealed()));
//! engine.start().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cast_reveal;
mod config;
mod error;
mod filmography;
mod matcher;
mod provider;
mod round;
mod session;

// Crate-level exports - Configuration and errors
pub use config::{ConfigError, GameConfig};
pub use error::{EngineError, ProviderError};

// Crate-level exports - Content provider
pub use provider::{
    CastMember, Catalog, CatalogMovie, Candidate, ContentProvider, GameMode, Movie, MovieId,
    Person, PersonId, RawCredit, genre_name,
};

// Crate-level exports - Matching
pub use matcher::{MatchKind, matches_subject, normalize_title, normalize_year, resolve_entry};

// Crate-level exports - Session plumbing
pub use round::{PlayMode, RoundHistory, RoundResult, SubjectRef};
pub use session::{CompletionListener, Reducer, SessionHost, StateListener, Transition};

// Crate-level exports - Cast reveal
pub use cast_reveal::{
    CastAction, CastOutcome, CastRevealEngine, CastRevealState, Forfeit, RoundPhase,
    SubjectPicker,
};

// Crate-level exports - Filmography
pub use filmography::{
    Countdown, FilmographyAction, FilmographyEngine, FilmographyEntry, FilmographyOutcome,
    FilmographyPhase, FilmographyState, GuessVerdict, HintTier, MAX_HINT_LEVEL, TICK_PERIOD, Tick,
    build_filmography,
};
