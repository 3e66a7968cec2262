//! Ephemeral "new items" badge.

use std::time::Duration;

use tokio::task::AbortHandle;

/// Default time a badge stays up before self-clearing.
pub const BADGE_CLEAR_AFTER: Duration = Duration::from_secs(5);

/// Transient new-items count surfaced after a scheduled poll discovers
/// additions.
///
/// Purely a UI signal: it has no effect on the merged collection. Arming
/// replaces any previously scheduled clear, so a second poll with additions
/// restarts the timeout instead of racing it.
#[derive(Debug, Default)]
pub struct BadgeState {
    count: usize,
    pending_clear: Option<AbortHandle>,
}

impl BadgeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Set the count and register the clear task superseding any pending
    /// one.
    pub fn arm(&mut self, count: usize, clear_task: AbortHandle) {
        if let Some(previous) = self.pending_clear.replace(clear_task) {
            previous.abort();
        }
        self.count = count;
    }

    /// Zero the count and drop any pending clear.
    pub fn clear(&mut self) {
        if let Some(pending) = self.pending_clear.take() {
            pending.abort();
        }
        self.count = 0;
    }
}

impl Drop for BadgeState {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_clear.take() {
            pending.abort();
        }
    }
}
