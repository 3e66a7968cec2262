//! Notisync Core Library
//!
//! Aggregates announcement and notification sources into one deduplicated,
//! read-state-aware feed: source snapshots are fetched concurrently,
//! merged with delta computation, annotated with optimistic read state,
//! and published to subscribers as immutable view snapshots. A coalescing
//! poller keeps the feed fresh; a filter module derives the rendered view.

pub mod adapter;
pub mod badge;
pub mod domain;
pub mod engine;
pub mod fakes;
pub mod filter;
pub mod merge;
pub mod obs;
pub mod poller;
pub mod read_state;
pub mod telemetry;

pub use adapter::{ReadReceipts, SourceAdapter, SourceFetch};

pub use domain::{
    AckError, DateRangeFilter, EngineError, FetchError, FilterState, Notice, NoticeKey, Priority,
    ReadStatusFilter, Result, SourceCategory,
};

pub use engine::{
    EngineConfig, FeedView, RefreshOutcome, SourceError, SyncEngine, DEFAULT_POLL_INTERVAL,
};

pub use badge::BADGE_CLEAR_AFTER;
pub use filter::{apply, apply_at, sort_for_display};
pub use merge::{merge_sources, merged_notices, CategoryMap, MergeOutcome};
pub use poller::{Poller, TickKind};
pub use read_state::{unread_count, unread_ids, ReadLedger, RollbackPolicy};

pub use obs::RefreshSpan;
pub use telemetry::{init_tracing, init_tracing_from_env};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
