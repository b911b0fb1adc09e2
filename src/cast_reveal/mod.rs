//! Guess the movie from its cast, one photo at a time.

mod engine;
mod selection;
mod state;

pub use engine::CastRevealEngine;
pub use selection::SubjectPicker;
pub use state::{CastAction, CastOutcome, CastRevealState, Forfeit, RoundPhase};
