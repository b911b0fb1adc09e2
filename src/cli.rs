//! Command-line interface for cinequiz.

use clap::{Parser, Subcommand};
use cinequiz::{GameMode, PersonId};

/// Cinequiz - movie trivia in the terminal
#[derive(Parser, Debug)]
#[command(name = "cinequiz")]
#[command(about = "Guess movies from their cast, or name an actor's films", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the game config (TOML). Defaults apply when missing.
    #[arg(long, env = "CINEQUIZ_CONFIG", default_value = "cinequiz.toml")]
    pub config: std::path::PathBuf,

    /// Path to the movie catalog (JSON)
    #[arg(long, env = "CINEQUIZ_CATALOG", default_value = "catalog.json")]
    pub catalog: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Guess the movie as its cast is revealed
    Cast {
        /// Pool to draw subjects from (overrides config)
        #[arg(long)]
        mode: Option<GameMode>,

        /// Seed for subject selection (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Name every film an actor appeared in
    Filmography {
        /// Catalog id of the actor
        #[arg(long)]
        actor: PersonId,

        /// Countdown in seconds, 0 for untimed (overrides config)
        #[arg(long)]
        time_limit: Option<u32>,
    },

    /// List the actors available in the catalog
    Actors,
}
