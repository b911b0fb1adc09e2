//! Name every film an actor appeared in before the clock runs out.

mod engine;
mod entry;
mod state;
mod timer;

pub use engine::FilmographyEngine;
pub use entry::{FilmographyEntry, build_filmography};
pub use state::{
    FilmographyAction, FilmographyOutcome, FilmographyPhase, FilmographyState, GuessVerdict,
    HintTier, MAX_HINT_LEVEL,
};
pub use timer::{Countdown, TICK_PERIOD, Tick};
