//! Async host for cast-reveal sessions: pool loading and subject selection.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use super::selection::SubjectPicker;
use super::state::{CastAction, CastOutcome, CastRevealState, Forfeit};
use crate::provider::{Candidate, ContentProvider, Movie};
use crate::round::RoundResult;
use crate::session::SessionHost;
use crate::{EngineError, GameConfig};

/// Runs cast-reveal rounds over a provider's candidate pool.
///
/// Operations take `&mut self`, so a second call cannot start while one
/// is still awaiting the provider.
pub struct CastRevealEngine {
    provider: Arc<dyn ContentProvider>,
    config: GameConfig,
    picker: SubjectPicker,
    host: SessionHost<CastRevealState>,
}

impl CastRevealEngine {
    /// Creates an engine in the loading phase.
    #[instrument(skip(provider), fields(mode = %config.mode()))]
    pub fn new(provider: Arc<dyn ContentProvider>, config: GameConfig) -> Self {
        info!("Creating cast-reveal engine");
        let picker = SubjectPicker::new(*config.min_cast_with_photos(), *config.seed());
        let host = SessionHost::new(Self::initial_state(&config));
        Self {
            provider,
            config,
            picker,
            host,
        }
    }

    fn initial_state(config: &GameConfig) -> CastRevealState {
        CastRevealState::new(
            *config.reveal_budget(),
            *config.history_limit(),
            *config.mode(),
            config.language().clone(),
        )
    }

    /// Current snapshot.
    pub fn state(&self) -> &CastRevealState {
        self.host.state()
    }

    /// Registers a snapshot listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&CastRevealState) + Send + 'static) {
        self.host.subscribe(listener);
    }

    /// Registers a round-completion listener.
    pub fn on_round_complete(&mut self, listener: impl FnMut(&RoundResult) + Send + 'static) {
        self.host.on_round_complete(listener);
    }

    /// Fetches the candidate pool and refills the working pool from it.
    ///
    /// Failures are published on the snapshot and returned; the engine stays
    /// in the loading phase.
    #[instrument(skip(self), fields(mode = %self.config.mode()))]
    pub async fn load_pool(&mut self) -> Result<usize, EngineError> {
        let mode = *self.config.mode();
        let language = self.config.language().clone();

        let pool = match self.provider.pool_for_mode(mode, &language).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "Pool fetch failed");
                return Err(self.fail(EngineError::from(e)));
            }
        };

        if pool.is_empty() {
            warn!("Provider returned an empty pool");
            return Err(self.fail(EngineError::EmptyPool { mode, language }));
        }

        self.picker.refill(pool);
        info!(eligible = self.picker.remaining(), "Pool loaded");
        Ok(self.picker.remaining())
    }

    /// Loads the pool and starts the first round.
    ///
    /// A round already in flight is left alone and the pool is not touched.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<CastOutcome, EngineError> {
        if self.state().is_in_round() {
            debug!("Start ignored while a round is in flight");
            return Ok(CastOutcome::RoundInProgress);
        }
        self.load_pool().await?;
        self.next_round().await
    }

    /// Selects a new subject and starts a round with one clue showing.
    #[instrument(skip(self))]
    pub async fn next_round(&mut self) -> Result<CastOutcome, EngineError> {
        if self.state().is_in_round() {
            return Ok(CastOutcome::RoundInProgress);
        }
        let subject = self.select_subject().await?;
        Ok(self.host.dispatch(CastAction::StartRound { subject }))
    }

    /// Same as [`CastRevealEngine::next_round`], after a give-up.
    #[instrument(skip(self))]
    pub async fn play_again(&mut self) -> Result<CastOutcome, EngineError> {
        self.next_round().await
    }

    /// Evaluates a guess against the current subject.
    #[instrument(skip(self, candidate), fields(guess_id = *candidate.id()))]
    pub fn take_guess(&mut self, candidate: Candidate) -> CastOutcome {
        self.host.dispatch(CastAction::Guess {
            candidate,
            at: Utc::now(),
        })
    }

    /// Reveals one more cast member without guessing.
    #[instrument(skip(self))]
    pub fn reveal_next_cast(&mut self) -> CastOutcome {
        self.host.dispatch(CastAction::RevealNext)
    }

    /// Records the round as lost and waits for [`CastRevealEngine::play_again`].
    #[instrument(skip(self))]
    pub fn give_up(&mut self) -> CastOutcome {
        self.host.dispatch(CastAction::Forfeit {
            reason: Forfeit::GiveUp,
            at: Utc::now(),
        })
    }

    /// Records the round as lost and moves straight to the next subject.
    #[instrument(skip(self))]
    pub async fn skip_subject(&mut self) -> Result<CastOutcome, EngineError> {
        let outcome = self.host.dispatch(CastAction::Forfeit {
            reason: Forfeit::Skip,
            at: Utc::now(),
        });
        debug!(?outcome, "Skipped subject");
        self.next_round().await
    }

    /// Drops the session and starts over in the loading phase.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting cast-reveal session");
        self.picker.clear();
        self.host.replace(Self::initial_state(&self.config));
    }

    /// Searches the provider for guess candidates.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Candidate>, EngineError> {
        Ok(self
            .provider
            .search_subjects(query, self.config.language())
            .await?)
    }

    /// Draws candidates until one has enough cast photos.
    ///
    /// At most `max_selection_attempts` candidates are examined before the
    /// pool is refilled from the provider; one pass follows the refill.
    #[instrument(skip(self))]
    async fn select_subject(&mut self) -> Result<Movie, EngineError> {
        let max_attempts = *self.config.max_selection_attempts();
        let language = self.config.language().clone();
        let mut examined = 0;

        for pass in 0..2 {
            if pass > 0 || self.picker.remaining() == 0 {
                self.load_pool().await?;
            }

            for _ in 0..max_attempts {
                let Some(candidate) = self.picker.draw() else {
                    break;
                };
                examined += 1;
                let movie_id = *candidate.id();

                let cast = match self.provider.credits(movie_id, &language).await {
                    Ok(cast) => cast,
                    Err(e) => {
                        warn!(movie_id, error = %e, "Credits fetch failed");
                        return Err(self.fail(EngineError::from(e)));
                    }
                };

                if let Some(subject) = self.picker.qualify(candidate, cast) {
                    self.picker.mark_used(movie_id);
                    info!(movie_id, examined, "Subject selected");
                    return Ok(subject);
                }
                debug!(movie_id, "Discarded unqualified candidate");
            }
            debug!(pass, examined, "Selection pass exhausted");
        }

        warn!(examined, "No qualified subject found");
        Err(self.fail(EngineError::NoSubjectQualified { attempts: examined }))
    }

    fn fail(&mut self, error: EngineError) -> EngineError {
        self.host.dispatch(CastAction::PoolFailed {
            message: error.to_string(),
        });
        error
    }
}

impl std::fmt::Debug for CastRevealEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CastRevealEngine")
            .field("config", &self.config)
            .field("picker", &self.picker)
            .field("host", &self.host)
            .finish()
    }
}
