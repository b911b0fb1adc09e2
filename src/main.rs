//! Cinequiz - terminal player
//!
//! Plays either game on stdin against a JSON catalog.

#![warn(missing_docs)]

mod cli;
mod play;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use cinequiz::{Catalog, GameConfig};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = load_config(&cli.config)?;
    let catalog = Catalog::from_file(&cli.catalog)
        .with_context(|| format!("Failed to load catalog {}", cli.catalog.display()))?;

    match cli.command {
        Command::Cast { mode, seed } => {
            let mut config = config;
            if let Some(mode) = mode {
                config = config.with_mode(mode);
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            play::run_cast(Arc::new(catalog), config).await
        }
        Command::Filmography { actor, time_limit } => {
            let person = catalog
                .person(actor)
                .cloned()
                .with_context(|| format!("No actor with id {} in catalog", actor))?;
            let config = match time_limit {
                Some(secs) => config.with_time_limit_secs(secs),
                None => config,
            };
            play::run_filmography(Arc::new(catalog), config, person).await
        }
        Command::Actors => {
            for person in catalog.people() {
                println!("{:>8}  {}", person.id(), person.name());
            }
            Ok(())
        }
    }
}

#[instrument(skip(path), fields(path = %path.display()))]
fn load_config(path: &std::path::Path) -> Result<GameConfig> {
    if path.exists() {
        Ok(GameConfig::from_file(path)?)
    } else {
        warn!("Config file not found, using defaults");
        Ok(GameConfig::default())
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,cinequiz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Tracing initialized");
}
