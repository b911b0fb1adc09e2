//! Error types for the session engines and content provider boundary.

use derive_more::{Display, Error, From};
use tracing::instrument;

use crate::provider::{GameMode, PersonId};

/// Content provider failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Provider error: {} at {}:{}", message, file, line)]
pub struct ProviderError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ProviderError {
    /// Creates a new provider error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ProviderError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for ProviderError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Catalog parse error: {}", err))
    }
}

/// Failure surfaced by a session engine operation.
///
/// Stale actions (a guess after the round ended, a hint after time ran out)
/// are not errors; they come back as typed outcomes on the reducers.
#[derive(Debug, Clone, Display, Error, From)]
pub enum EngineError {
    /// The provider returned no candidates for the mode.
    #[display("No subjects available for mode {} ({})", mode, language)]
    EmptyPool {
        /// Mode the pool was requested for.
        mode: GameMode,
        /// Language the pool was requested in.
        language: String,
    },

    /// A provider call failed.
    #[display("Failed to fetch content: {}", _0)]
    #[from]
    Fetch(ProviderError),

    /// The actor has no eligible films once dedup and date filters ran.
    #[display("No eligible films for person {}", actor)]
    EmptyFilmography {
        /// Person the filmography was requested for.
        actor: PersonId,
    },

    /// Every selection pass, including one after a pool refill, came up empty.
    #[display("No subject with enough cast photos after {} attempts", attempts)]
    NoSubjectQualified {
        /// Total candidates examined.
        attempts: usize,
    },
}
