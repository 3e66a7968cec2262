//! Cooperative refresh scheduler.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Why a refresh cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// First cycle after start.
    Initial,
    /// Interval-driven cycle. The only kind that can arm the badge.
    Scheduled,
    /// User-triggered refresh.
    Manual,
}

/// Fixed-interval scheduler driving refresh cycles.
///
/// Fires `on_tick` once immediately with [`TickKind::Initial`], then every
/// `interval` with [`TickKind::Scheduled`]. Ticks never overlap each other:
/// the next tick is not armed until `on_tick` returns. Overlap with manual
/// refreshes is the engine's concern, handled by its shared in-flight guard
/// (an overdue cycle is skipped, never queued).
pub struct Poller {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the polling loop.
    pub fn start<F, Fut>(interval: Duration, on_tick: F) -> Self
    where
        F: Fn(TickKind) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut kind = TickKind::Initial;
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = timer.tick() => {
                        on_tick(kind).await;
                        kind = TickKind::Scheduled;
                    }
                }
            }
            debug!(event = "poller.stopped");
        });
        Self { shutdown, handle }
    }

    /// Signal shutdown. A tick already in flight finishes; its results are
    /// the engine's to discard.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Whether the polling loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}
