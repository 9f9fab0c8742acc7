//! Tick sources for the debounce loop
//!
//! The loop never reads the clock itself; it waits on whatever `Ticker` it
//! was given.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Periodic signal consumed by the debounce loop
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick
    ///
    /// Must be cancel-safe: the loop drops this future whenever another
    /// signal wins the select.
    async fn tick(&mut self);
}

/// Free-running wall-clock ticker
///
/// The first tick fires one full period after creation. Ticks are not reset
/// by incoming events; ticks missed while the loop was busy are skipped.
/// A period too long to land on the clock never ticks.
pub struct IntervalTicker {
    interval: Option<Interval>,
}

impl IntervalTicker {
    /// Create a ticker with the given period
    ///
    /// # Panics
    /// Panics if `period` is zero.
    pub fn new(period: Duration) -> Self {
        let interval = Instant::now().checked_add(period).map(|start| {
            let mut interval = interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        match &mut self.interval {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

/// Ticker that fires only when told to
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Trigger for a `ManualTicker`
#[derive(Clone)]
pub struct TickSender {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicker {
    pub fn new() -> (Self, TickSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, TickSender { tx })
    }
}

impl TickSender {
    /// Queue one tick; returns false if the ticker is gone
    pub fn tick(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            // Sender dropped: no more ticks, ever
            std::future::pending::<()>().await;
        }
    }
}
