//! Feed synchronization engine.
//!
//! [`SyncEngine`] owns the source adapters, the merged feed state, and the
//! poller, and publishes immutable [`FeedView`] snapshots through a watch
//! channel. Renderers subscribe via [`SyncEngine::subscribe`] and re-derive
//! their view with the [`crate::filter`] module; every mutation publishes a
//! complete snapshot under one lock, so a subscriber never observes a
//! mid-merge collection.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::adapter::{ReadReceipts, SourceAdapter, SourceFetch};
use crate::badge::{BadgeState, BADGE_CLEAR_AFTER};
use crate::domain::error::Result;
use crate::domain::{AckError, EngineError, FetchError, Notice, NoticeKey, SourceCategory};
use crate::filter;
use crate::merge::{self, CategoryMap};
use crate::obs;
use crate::poller::{Poller, TickKind};
use crate::read_state::{self, unread_count, ReadLedger, RollbackPolicy};

/// Production poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scheduled refresh interval.
    pub poll_interval: Duration,
    /// How long the new-items badge stays up.
    pub badge_clear_after: Duration,
    /// What happens to the optimistic read flag when the upstream
    /// acknowledgement fails.
    pub rollback_policy: RollbackPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            badge_clear_after: BADGE_CLEAR_AFTER,
            rollback_policy: RollbackPolicy::KeepLocal,
        }
    }
}

/// One source's failure as carried in a published view. The failed
/// category's previous sub-collection is still present in the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceError {
    pub category: SourceCategory,
    pub error: FetchError,
}

/// Outcome of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A full fetch-merge cycle ran and its results were applied.
    Completed,
    /// Another cycle was already in flight; this request was dropped
    /// (not queued).
    Coalesced,
    /// The engine is stopped; results, if any, were discarded.
    Stopped,
}

/// Immutable snapshot published to subscribers.
#[derive(Debug, Clone)]
pub struct FeedView {
    /// Merged feed: read-annotated and display-sorted (pinned first, then
    /// newest first).
    pub notices: Vec<Notice>,
    /// Ephemeral badge count from the latest scheduled poll.
    pub new_items: usize,
    /// Sources whose latest fetch failed.
    pub source_errors: Vec<SourceError>,
    /// False until the first refresh cycle has settled.
    pub first_load_complete: bool,
    /// When this snapshot was generated.
    pub generated_at: DateTime<Utc>,
}

impl Default for FeedView {
    fn default() -> Self {
        Self {
            notices: Vec::new(),
            new_items: 0,
            source_errors: Vec::new(),
            first_load_complete: false,
            generated_at: Utc::now(),
        }
    }
}

impl FeedView {
    /// Unread count for one category, recomputed from the collection.
    pub fn unread_count(&self, category: SourceCategory) -> usize {
        unread_count(&self.notices, category)
    }

    /// Unread count across all categories.
    pub fn total_unread(&self) -> usize {
        self.notices.iter().filter(|n| !n.read).count()
    }

    /// True only when every source failed and nothing was ever loaded.
    /// This is the one case where an empty feed means "show the error
    /// state" instead of the last-known-good collection.
    pub fn all_sources_down(&self) -> bool {
        self.notices.is_empty() && self.source_errors.len() == SourceCategory::ALL.len()
    }
}

struct EngineState {
    by_category: CategoryMap,
    ledger: ReadLedger,
    source_errors: Vec<SourceError>,
    badge: BadgeState,
    first_load_complete: bool,
}

struct EngineInner {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    receipts: Arc<dyn ReadReceipts>,
    config: EngineConfig,
    state: Mutex<EngineState>,
    views: watch::Sender<FeedView>,
    in_flight: AtomicBool,
    stopped: AtomicBool,
}

/// The notification feed synchronization engine.
///
/// Lifecycle: [`SyncEngine::start`] spawns the poller (one immediate cycle,
/// then one per interval); [`SyncEngine::stop`] halts polling, lets
/// in-flight fetches settle, and discards their results. No ambient
/// globals: every timer and cached snapshot lives inside the instance.
pub struct SyncEngine {
    inner: Arc<EngineInner>,
    poller: Mutex<Option<Poller>>,
}

impl SyncEngine {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        receipts: Arc<dyn ReadReceipts>,
        config: EngineConfig,
    ) -> Self {
        let (views, _) = watch::channel(FeedView::default());
        Self {
            inner: Arc::new(EngineInner {
                adapters,
                receipts,
                config,
                state: Mutex::new(EngineState {
                    by_category: CategoryMap::new(),
                    ledger: ReadLedger::new(),
                    source_errors: Vec::new(),
                    badge: BadgeState::new(),
                    first_load_complete: false,
                }),
                views,
                in_flight: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
            }),
            poller: Mutex::new(None),
        }
    }

    /// Subscribe to published feed snapshots.
    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.inner.views.subscribe()
    }

    /// Latest published view.
    pub fn current_view(&self) -> FeedView {
        self.inner.views.borrow().clone()
    }

    /// Start the poll loop: one immediate cycle, then one per interval.
    pub fn start(&self) -> Result<()> {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return Err(EngineError::Stopped);
        }
        let mut slot = self.poller.lock().unwrap();
        if slot.is_some() {
            return Err(EngineError::AlreadyStarted);
        }
        let inner = Arc::clone(&self.inner);
        *slot = Some(Poller::start(
            self.inner.config.poll_interval,
            move |kind| {
                let inner = Arc::clone(&inner);
                async move {
                    inner.refresh(kind).await;
                }
            },
        ));
        Ok(())
    }

    /// User-triggered refresh. Bypasses the interval timer but shares the
    /// in-flight guard with scheduled ticks, and never arms the badge.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.inner.refresh(TickKind::Manual).await
    }

    /// Stop polling. In-flight fetches settle but their results are
    /// discarded; no state mutation happens after this returns.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        if let Some(poller) = self.poller.lock().unwrap().take() {
            poller.stop();
        }
        debug!(event = "engine.stopped");
    }

    /// Optimistically mark one notice read, publish, then deliver the
    /// receipt upstream.
    ///
    /// On receipt failure the local flag is kept (or restored, under
    /// [`RollbackPolicy::RevertOnFailure`]) and the error is returned for
    /// optional retry or logging.
    pub async fn mark_read(&self, key: NoticeKey) -> Result<()> {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return Err(EngineError::Stopped);
        }

        let prior_override = {
            let mut state = self.inner.state.lock().unwrap();
            let known = state
                .by_category
                .get(&key.source)
                .is_some_and(|notices| notices.iter().any(|n| n.id == key.id));
            if !known {
                return Err(EngineError::UnknownNotice(key));
            }
            let prior_override = state.ledger.get(&key);
            state.ledger.set(key, true);
            self.inner.publish(&state);
            prior_override
        };

        match self.inner.receipts.acknowledge(key).await {
            Ok(()) => Ok(()),
            Err(error) => {
                obs::emit_receipt_failed(&error);
                if self.inner.config.rollback_policy == RollbackPolicy::RevertOnFailure {
                    self.inner.restore_override(key, prior_override);
                }
                Err(EngineError::Ack(AckError::Receipt { key, source: error }))
            }
        }
    }

    /// Optimistically mark every unread notice in `category` read, publish,
    /// then acknowledge upstream: one bulk call for direct notifications,
    /// one call per id elsewhere.
    pub async fn mark_all_read(&self, category: SourceCategory) -> Result<()> {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return Err(EngineError::Stopped);
        }

        let flipped: Vec<(i64, Option<bool>)> = {
            let mut state = self.inner.state.lock().unwrap();
            let mut notices = state
                .by_category
                .get(&category)
                .cloned()
                .unwrap_or_default();
            state.ledger.annotate(&mut notices);
            let ids = read_state::unread_ids(&notices, category);

            let flipped = ids
                .iter()
                .map(|id| {
                    let notice_key = NoticeKey::new(category, *id);
                    let prior = state.ledger.get(&notice_key);
                    state.ledger.set(notice_key, true);
                    (*id, prior)
                })
                .collect::<Vec<_>>();
            if !flipped.is_empty() {
                self.inner.publish(&state);
            }
            flipped
        };

        if flipped.is_empty() {
            return Ok(());
        }

        match category {
            SourceCategory::DirectNotification => {
                if let Err(error) = self.inner.receipts.acknowledge_all_direct().await {
                    obs::emit_receipt_failed(&error);
                    if self.inner.config.rollback_policy == RollbackPolicy::RevertOnFailure {
                        for (id, prior) in &flipped {
                            self.inner
                                .restore_override(NoticeKey::new(category, *id), *prior);
                        }
                    }
                    return Err(EngineError::Ack(AckError::Bulk {
                        category,
                        source: error,
                    }));
                }
                Ok(())
            }
            _ => {
                let mut errors = Vec::new();
                for (id, prior) in &flipped {
                    let notice_key = NoticeKey::new(category, *id);
                    if let Err(error) = self.inner.receipts.acknowledge(notice_key).await {
                        obs::emit_receipt_failed(&error);
                        if self.inner.config.rollback_policy == RollbackPolicy::RevertOnFailure {
                            self.inner.restore_override(notice_key, *prior);
                        }
                        errors.push((*id, error));
                    }
                }
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(EngineError::Ack(AckError::Partial {
                        category,
                        attempted: flipped.len(),
                        failed: errors.len(),
                        errors,
                    }))
                }
            }
        }
    }
}

impl EngineInner {
    /// Run one fetch-merge cycle, unless one is already in flight or the
    /// engine is stopped.
    async fn refresh(self: &Arc<Self>, kind: TickKind) -> RefreshOutcome {
        if self.stopped.load(Ordering::SeqCst) {
            return RefreshOutcome::Stopped;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            obs::emit_refresh_coalesced(kind);
            return RefreshOutcome::Coalesced;
        }

        obs::emit_refresh_started(kind);
        let fetched = self.fetch_all().await;

        let outcome = if self.stopped.load(Ordering::SeqCst) {
            debug!(event = "refresh.discarded", kind = ?kind);
            RefreshOutcome::Stopped
        } else {
            self.apply(kind, fetched);
            RefreshOutcome::Completed
        };
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    /// Fan out every adapter concurrently and fan in once all have settled,
    /// successfully or with error.
    async fn fetch_all(&self) -> Vec<SourceFetch> {
        let mut join_set = JoinSet::new();
        for adapter in &self.adapters {
            let adapter = Arc::clone(adapter);
            join_set.spawn(async move {
                SourceFetch {
                    category: adapter.category(),
                    result: adapter.fetch().await,
                }
            });
        }

        let mut fetched = Vec::with_capacity(self.adapters.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(fetch) => fetched.push(fetch),
                Err(error) => warn!(event = "refresh.fetch_task_failed", error = %error),
            }
        }
        fetched
    }

    /// Merge fetched snapshots into the feed and publish. Only scheduled
    /// ticks arm the badge; initial load and manual refresh never do.
    fn apply(self: &Arc<Self>, kind: TickKind, fetched: Vec<SourceFetch>) {
        let mut state = self.state.lock().unwrap();
        let outcome = merge::merge_sources(&state.by_category, fetched);

        for (category, error) in &outcome.failures {
            obs::emit_source_failed(*category, error);
        }
        obs::emit_merge_applied(
            kind,
            outcome.by_category.values().map(Vec::len).sum::<usize>(),
            outcome.added.len(),
            outcome.failures.len(),
        );

        state.source_errors = outcome
            .failures
            .into_iter()
            .map(|(category, error)| SourceError { category, error })
            .collect();
        state.by_category = outcome.by_category;

        let live: HashSet<NoticeKey> = state
            .by_category
            .values()
            .flatten()
            .map(Notice::key)
            .collect();
        state.ledger.retain_keys(&live);
        state.first_load_complete = true;

        if kind == TickKind::Scheduled && !outcome.added.is_empty() {
            self.arm_badge(&mut state, outcome.added.len());
        }
        self.publish(&state);
    }

    /// Set the badge and schedule its clear, superseding any pending one.
    fn arm_badge(self: &Arc<Self>, state: &mut EngineState, count: usize) {
        let after = self.config.badge_clear_after;
        let weak = Arc::downgrade(self);
        let clear = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(inner) = weak.upgrade() {
                inner.clear_badge();
            }
        });
        state.badge.arm(count, clear.abort_handle());
        obs::emit_badge_armed(count);
    }

    fn clear_badge(&self) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock().unwrap();
        if state.badge.count() == 0 {
            return;
        }
        state.badge.clear();
        obs::emit_badge_cleared();
        self.publish(&state);
    }

    /// Restore a pre-mutation ledger entry after a failed receipt.
    fn restore_override(&self, key: NoticeKey, prior: Option<bool>) {
        let mut state = self.state.lock().unwrap();
        match prior {
            Some(value) => state.ledger.set(key, value),
            None => state.ledger.clear(key),
        }
        self.publish(&state);
    }

    /// Publish a complete, annotated, display-sorted snapshot.
    fn publish(&self, state: &EngineState) {
        let mut notices = merge::merged_notices(&state.by_category);
        state.ledger.annotate(&mut notices);
        filter::sort_for_display(&mut notices);

        self.views.send_replace(FeedView {
            notices,
            new_items: state.badge.count(),
            source_errors: state.source_errors.clone(),
            first_load_complete: state.first_load_complete,
            generated_at: Utc::now(),
        });
    }
}
