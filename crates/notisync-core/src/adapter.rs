//! Injectable seams between the engine and its upstream sources.
//!
//! Implement [`SourceAdapter`] to plug in real REST endpoints or test
//! stubs; implement [`ReadReceipts`] for the acknowledgement side.

use async_trait::async_trait;

use crate::domain::{FetchError, Notice, NoticeKey, SourceCategory};

/// One upstream endpoint normalized to the shared [`Notice`] shape.
///
/// Adapters are stateless between calls: every `fetch` returns the complete
/// current snapshot of its source, never a delta, and never retries
/// internally. Failures surface as typed [`FetchError`]s for the engine to
/// scope to this adapter's category.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Category this adapter feeds. One adapter owns exactly one category.
    fn category(&self) -> SourceCategory;

    /// Fetch the source's current snapshot.
    async fn fetch(&self) -> Result<Vec<Notice>, FetchError>;
}

/// Upstream acknowledgement of read receipts.
#[async_trait]
pub trait ReadReceipts: Send + Sync {
    /// Acknowledge a single notice as read.
    async fn acknowledge(&self, key: NoticeKey) -> Result<(), FetchError>;

    /// Bulk-acknowledge every direct notification. Only the
    /// direct-notification upstream exposes a bulk endpoint; the other
    /// categories fall back to one [`ReadReceipts::acknowledge`] call per id.
    async fn acknowledge_all_direct(&self) -> Result<(), FetchError>;
}

/// The settled result of one adapter's fetch within a refresh cycle.
#[derive(Debug)]
pub struct SourceFetch {
    pub category: SourceCategory,
    pub result: Result<Vec<Notice>, FetchError>,
}

impl SourceFetch {
    pub fn ok(category: SourceCategory, notices: Vec<Notice>) -> Self {
        Self {
            category,
            result: Ok(notices),
        }
    }

    pub fn failed(category: SourceCategory, error: FetchError) -> Self {
        Self {
            category,
            result: Err(error),
        }
    }
}
