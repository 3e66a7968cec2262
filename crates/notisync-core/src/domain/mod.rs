//! Domain models for the notification feed.
//!
//! Canonical definitions for the core entities:
//! - `Notice`: unified record produced by every source adapter
//! - `NoticeKey`: engine-wide `(source, id)` identity
//! - `FilterState`: composable predicate over the merged feed
//! - error taxonomy for fetches, receipts, and engine lifecycle

pub mod error;
pub mod filter;
pub mod notice;

// Re-export main types and errors
pub use error::{AckError, EngineError, FetchError, Result};
pub use filter::{DateRangeFilter, FilterState, ReadStatusFilter};
pub use notice::{Notice, NoticeKey, Priority, SourceCategory};
