//! Async host for filmography rounds: loading, countdown and dispatch.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::entry::build_filmography;
use super::state::{FilmographyAction, FilmographyOutcome, FilmographyState, GuessVerdict};
use super::timer::{Countdown, TICK_PERIOD, Tick};
use crate::provider::{Candidate, ContentProvider, MovieId, Person};
use crate::round::RoundResult;
use crate::session::SessionHost;
use crate::{EngineError, GameConfig};

/// Runs timed "name every film" rounds for one actor at a time.
pub struct FilmographyEngine {
    provider: Arc<dyn ContentProvider>,
    config: GameConfig,
    host: SessionHost<FilmographyState>,
    countdown: Option<Countdown>,
    generation: u64,
    tick_tx: mpsc::UnboundedSender<Tick>,
    tick_rx: mpsc::UnboundedReceiver<Tick>,
}

impl FilmographyEngine {
    /// Creates an idle engine.
    #[instrument(skip(provider))]
    pub fn new(provider: Arc<dyn ContentProvider>, config: GameConfig) -> Self {
        info!("Creating filmography engine");
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let host = SessionHost::new(FilmographyState::new(config.language().clone()));
        Self {
            provider,
            config,
            host,
            countdown: None,
            generation: 0,
            tick_tx,
            tick_rx,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &FilmographyState {
        self.host.state()
    }

    /// Registers a snapshot listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&FilmographyState) + Send + 'static) {
        self.host.subscribe(listener);
    }

    /// Registers a round-completion listener.
    pub fn on_round_complete(&mut self, listener: impl FnMut(&RoundResult) + Send + 'static) {
        self.host.on_round_complete(listener);
    }

    /// Returns `true` while a countdown is armed.
    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_some()
    }

    /// Loads an actor's filmography and starts a round.
    ///
    /// Any running countdown is cancelled before the fetch. The new one is
    /// armed only when the round has at least one entry.
    #[instrument(skip(self, actor), fields(actor_id = *actor.id()))]
    pub async fn select_subject(&mut self, actor: Person) -> Result<usize, EngineError> {
        self.cancel_countdown();
        self.generation += 1;

        let credits = match self
            .provider
            .person_filmography(*actor.id(), self.config.language())
            .await
        {
            Ok(credits) => credits,
            Err(e) => {
                warn!(error = %e, "Filmography fetch failed");
                let error = EngineError::from(e);
                self.host.dispatch(FilmographyAction::LoadFailed {
                    message: error.to_string(),
                });
                return Err(error);
            }
        };

        let entries = build_filmography(&credits, Utc::now().date_naive());
        let actor_id = *actor.id();
        let time_limit_secs = self
            .config
            .time_limit()
            .map(|_| *self.config.time_limit_secs());

        match self.host.dispatch(FilmographyAction::Load {
            actor,
            entries,
            time_limit_secs,
        }) {
            FilmographyOutcome::Started { total } => {
                if self.state().needs_ticks() {
                    self.countdown = Some(Countdown::start(
                        self.generation,
                        TICK_PERIOD,
                        self.tick_tx.clone(),
                    ));
                }
                info!(total, countdown = self.countdown.is_some(), "Filmography round ready");
                Ok(total)
            }
            outcome => {
                debug!(?outcome, "Round did not start");
                Err(EngineError::EmptyFilmography { actor: actor_id })
            }
        }
    }

    /// Judges a guess against the current filmography.
    #[instrument(skip(self, candidate), fields(guess_id = *candidate.id()))]
    pub fn guess(&mut self, candidate: Candidate) -> GuessVerdict {
        let outcome = self.host.dispatch(FilmographyAction::Guess {
            candidate,
            at: Utc::now(),
        });
        self.sync_countdown();
        match outcome {
            FilmographyOutcome::Guess(verdict) => verdict,
            other => {
                warn!(?other, "Unexpected outcome for guess");
                GuessVerdict::NotRunning
            }
        }
    }

    /// Raises an entry's hint level by one and returns the resulting level.
    #[instrument(skip(self))]
    pub fn reveal_hint(&mut self, entry_id: MovieId) -> u8 {
        match self.host.dispatch(FilmographyAction::RevealHint { entry_id }) {
            FilmographyOutcome::Hint { level, .. } => level,
            _ => self.state().hint_level(entry_id),
        }
    }

    /// Waits for the next countdown tick and applies it.
    ///
    /// Returns `None` at once when no countdown is armed. Ticks left over
    /// from an earlier round are discarded.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub async fn next_tick(&mut self) -> Option<FilmographyOutcome> {
        while self.countdown.is_some() {
            let tick = self.tick_rx.recv().await?;
            if tick.generation != self.generation {
                debug!(stale = tick.generation, "Discarding stale tick");
                continue;
            }
            let outcome = self.host.dispatch(FilmographyAction::Tick { at: Utc::now() });
            self.sync_countdown();
            return Some(outcome);
        }
        None
    }

    /// Cancels the countdown and returns to idle.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting filmography session");
        self.cancel_countdown();
        self.generation += 1;
        self.host.dispatch(FilmographyAction::Reset);
    }

    /// Searches the provider for guess candidates.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Candidate>, EngineError> {
        Ok(self
            .provider
            .search_subjects(query, self.config.language())
            .await?)
    }

    fn sync_countdown(&mut self) {
        if self.countdown.is_some() && !self.state().needs_ticks() {
            debug!("Round no longer needs ticks");
            self.cancel_countdown();
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            debug!(generation = countdown.generation(), "Countdown released");
        }
    }
}

impl std::fmt::Debug for FilmographyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilmographyEngine")
            .field("config", &self.config)
            .field("host", &self.host)
            .field("countdown", &self.countdown)
            .field("generation", &self.generation)
            .finish()
    }
}
