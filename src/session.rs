//! Dispatch loop shared by both session engines.
//!
//! Engines are pure reducers; the host owns the current snapshot, applies
//! actions, and pushes every new snapshot and every completed round to the
//! registered listeners.

use tracing::{debug, instrument};

use crate::round::RoundResult;

/// A session state that evolves by reducing actions.
pub trait Reducer: Clone {
    /// Input the state reacts to.
    type Action: std::fmt::Debug;
    /// Typed answer handed back to the caller of `dispatch`.
    type Outcome: std::fmt::Debug;

    /// Computes the next state from this one. Never mutates `self`.
    fn reduce(&self, action: Self::Action) -> Transition<Self, Self::Outcome>;
}

/// Result of reducing one action.
#[derive(Debug, Clone)]
pub struct Transition<S, O> {
    state: S,
    outcome: O,
    changed: bool,
    completed: Option<RoundResult>,
}

impl<S, O> Transition<S, O> {
    /// A transition to a new state.
    pub fn next(state: S, outcome: O) -> Self {
        Self {
            state,
            outcome,
            changed: true,
            completed: None,
        }
    }

    /// A transition that also completes the round.
    pub fn completing(state: S, outcome: O, result: RoundResult) -> Self {
        Self {
            state,
            outcome,
            changed: true,
            completed: Some(result),
        }
    }

    /// A rejected or no-op action; listeners are not notified.
    pub fn unchanged(state: S, outcome: O) -> Self {
        Self {
            state,
            outcome,
            changed: false,
            completed: None,
        }
    }

    /// The resulting state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The caller-facing outcome.
    pub fn outcome(&self) -> &O {
        &self.outcome
    }

    /// Whether the state differs from the one reduced.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// The round result, if this transition completed a round.
    pub fn completed(&self) -> Option<&RoundResult> {
        self.completed.as_ref()
    }

    /// Splits into state, outcome and completed round.
    pub fn into_parts(self) -> (S, O, Option<RoundResult>) {
        (self.state, self.outcome, self.completed)
    }
}

/// Callback receiving every published snapshot.
pub type StateListener<S> = Box<dyn FnMut(&S) + Send>;

/// Callback receiving every completed round.
pub type CompletionListener = Box<dyn FnMut(&RoundResult) + Send>;

/// Owns a session snapshot and publishes each replacement.
pub struct SessionHost<S: Reducer> {
    state: S,
    listeners: Vec<StateListener<S>>,
    completion_listeners: Vec<CompletionListener>,
}

impl<S: Reducer> SessionHost<S> {
    /// Creates a host around an initial state.
    #[instrument(skip(initial))]
    pub fn new(initial: S) -> Self {
        debug!("Creating session host");
        Self {
            state: initial,
            listeners: Vec::new(),
            completion_listeners: Vec::new(),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Registers a snapshot listener.
    #[instrument(skip(self, listener), fields(listeners = self.listeners.len()))]
    pub fn subscribe(&mut self, listener: impl FnMut(&S) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Registers a round-completion listener.
    #[instrument(skip(self, listener), fields(listeners = self.completion_listeners.len()))]
    pub fn on_round_complete(&mut self, listener: impl FnMut(&RoundResult) + Send + 'static) {
        self.completion_listeners.push(Box::new(listener));
    }

    /// Reduces an action against the current snapshot and publishes the result.
    #[instrument(skip(self))]
    pub fn dispatch(&mut self, action: S::Action) -> S::Outcome {
        let transition = self.state.reduce(action);
        let changed = transition.changed();
        let (state, outcome, completed) = transition.into_parts();

        if changed {
            self.state = state;
            self.publish();
        } else {
            debug!(?outcome, "Action left state unchanged");
        }

        if let Some(result) = completed {
            debug!(subject = ?result.subject(), "Publishing round completion");
            for listener in &mut self.completion_listeners {
                listener(&result);
            }
        }

        outcome
    }

    /// Replaces the snapshot outright and publishes it.
    #[instrument(skip(self, state))]
    pub fn replace(&mut self, state: S) {
        self.state = state;
        self.publish();
    }

    fn publish(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl<S: Reducer + std::fmt::Debug> std::fmt::Debug for SessionHost<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHost")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("completion_listeners", &self.completion_listeners.len())
            .finish()
    }
}
