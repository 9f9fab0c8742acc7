//! Tick-driven debouncing of change notifications
//!
//! Any number of changes between two ticks collapse into a single pending
//! flag. On each tick, if the flag is set, the loop runs build then reload
//! and clears it. Ticks come from a free-running clock and are not reset by
//! incoming changes, so a change waits at most one full interval.

use crate::action::{Action, LogAction};
use crate::error::WatchError;
use crate::filter::ChangeFilter;
use crate::source::EventSource;
use crate::ticker::Ticker;
use crate::ChangeEvent;
use std::future::Future;
use tracing::{debug, info, warn};

/// The debounce state machine
///
/// Idle until a change arrives, Pending until the next tick dispatches.
pub struct DebounceLoop<T: Ticker> {
    ticker: T,
    filter: ChangeFilter,
    build: Box<dyn Action>,
    reload: Box<dyn Action>,
    gate_reload: bool,
    pending: bool,
    dispatches: u64,
}

impl<T: Ticker> DebounceLoop<T> {
    /// Create an idle loop with log-only actions and no filter
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            filter: ChangeFilter::accept_all(),
            build: Box::new(LogAction::new("build")),
            reload: Box::new(LogAction::new("reload")),
            gate_reload: false,
            pending: false,
            dispatches: 0,
        }
    }

    pub fn with_filter(mut self, filter: ChangeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_build(mut self, action: Box<dyn Action>) -> Self {
        self.build = action;
        self
    }

    pub fn with_reload(mut self, action: Box<dyn Action>) -> Self {
        self.reload = action;
        self
    }

    /// Skip reload when build fails
    pub fn with_gate_reload(mut self, gate: bool) -> Self {
        self.gate_reload = gate;
        self
    }

    /// Whether a change is waiting for the next tick
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of dispatch cycles run so far
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    /// Run until the event source reports an error
    ///
    /// Never returns `Ok`.
    pub async fn run(self, source: EventSource) -> Result<(), WatchError> {
        self.run_until(source, std::future::pending()).await
    }

    /// Run until the event source reports an error or `shutdown` completes
    ///
    /// The source is closed on every exit path. An error from the source is
    /// returned as received.
    pub async fn run_until<F>(mut self, mut source: EventSource, shutdown: F) -> Result<(), WatchError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let result = loop {
            debug!(pending = self.pending, dispatches = self.dispatches, "loop");

            let (changes, errors) = source.streams();

            // Queued changes are drained before a tick so they count toward it
            tokio::select! {
                biased;

                Some(err) = errors.recv() => break Err(err),
                Some(event) = changes.recv() => self.observe(event),
                _ = &mut shutdown => {
                    info!("Shutting down");
                    break Ok(());
                }
                _ = self.ticker.tick() => self.on_tick().await,
            }
        };

        source.close();
        result
    }

    /// Record a change notification
    pub fn observe(&mut self, event: ChangeEvent) {
        if !self.filter.accepts(&event.path) {
            debug!("Ignored {}", event);
            return;
        }

        info!("{}", event);
        self.pending = true;
    }

    /// Handle a tick: dispatch if anything changed since the last one
    pub async fn on_tick(&mut self) {
        if !self.pending {
            return;
        }

        self.dispatch().await;
        self.pending = false;
    }

    async fn dispatch(&mut self) {
        self.dispatches += 1;

        let built = match self.build.run().await {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        };

        if !built && self.gate_reload {
            warn!("Skipping {}: {} failed", self.reload.name(), self.build.name());
            return;
        }

        if let Err(e) = self.reload.run().await {
            warn!("{}", e);
        }
    }
}
