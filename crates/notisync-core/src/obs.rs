//! Structured observability hooks for engine lifecycle events.
//!
//! This module provides:
//! - Refresh-scoped tracing spans via the `RefreshSpan` RAII guard
//! - Emission functions for the key lifecycle events: refresh start,
//!   source failure, merge application, badge arm/clear
//!
//! Events are emitted at `info!` level; per-source failures at `warn!`.

use tracing::{info, warn};

use crate::domain::SourceCategory;
use crate::poller::TickKind;

/// RAII guard that enters a refresh-scoped tracing span for the duration of
/// one fetch-merge cycle.
pub struct RefreshSpan {
    _span: tracing::span::EnteredSpan,
}

impl RefreshSpan {
    /// Create and enter a span tagged with the tick kind.
    pub fn enter(kind: TickKind) -> Self {
        let span = tracing::info_span!("notisync.refresh", kind = ?kind);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a refresh cycle started.
pub fn emit_refresh_started(kind: TickKind) {
    info!(event = "refresh.started", kind = ?kind);
}

/// Emit event: a refresh request found another cycle in flight and was
/// dropped.
pub fn emit_refresh_coalesced(kind: TickKind) {
    info!(event = "refresh.coalesced", kind = ?kind);
}

/// Emit event: one source's fetch failed; its stale snapshot is retained.
pub fn emit_source_failed(category: SourceCategory, error: &dyn std::fmt::Display) {
    warn!(event = "source.failed", category = %category, error = %error);
}

/// Emit event: a merge was applied to the feed.
pub fn emit_merge_applied(kind: TickKind, total: usize, added: usize, failures: usize) {
    info!(
        event = "merge.applied",
        kind = ?kind,
        total = total,
        added = added,
        failures = failures,
    );
}

/// Emit event: the new-items badge was armed.
pub fn emit_badge_armed(count: usize) {
    info!(event = "badge.armed", count = count);
}

/// Emit event: the new-items badge self-cleared.
pub fn emit_badge_cleared() {
    info!(event = "badge.cleared");
}

/// Emit event: a read receipt could not be delivered (warning level).
pub fn emit_receipt_failed(detail: &dyn std::fmt::Display) {
    warn!(event = "receipt.failed", error = %detail);
}
