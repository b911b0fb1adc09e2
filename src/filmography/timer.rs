//! The round countdown as a scoped ticking handle.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, instrument};

/// Interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A tick from the countdown armed for round `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick {
    /// Round the countdown was armed for.
    pub generation: u64,
}

/// Repeating ticker that sends a [`Tick`] every period until dropped.
///
/// Dropping the handle aborts the task, so at most one ticker lives per
/// owner as long as the owner replaces rather than duplicates it. Ticks
/// already queued when the handle drops are still delivered; receivers
/// filter them by generation.
#[derive(Debug)]
pub struct Countdown {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Arms a ticker. Must be called inside a Tokio runtime.
    #[instrument(skip(sender))]
    pub fn start(generation: u64, period: Duration, sender: mpsc::UnboundedSender<Tick>) -> Self {
        debug!("Arming countdown");
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sender.send(Tick { generation }).is_err() {
                    break;
                }
            }
        });
        Self { generation, handle }
    }

    /// Round this countdown was armed for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        debug!(generation = self.generation, "Cancelling countdown");
        self.handle.abort();
    }
}
