//! Error taxonomy for the sync engine.

use thiserror::Error;

use crate::domain::notice::{NoticeKey, SourceCategory};

/// Failure fetching one source's snapshot or delivering a read receipt.
///
/// Scoped per source: one adapter's failure never aborts the other
/// adapters or the merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Missing or expired bearer token. Surfaced to the auth collaborator;
    /// the engine does not retry or refresh tokens itself.
    #[error("unauthorized: bearer token missing or expired")]
    Unauthorized,

    /// Transport-level failure. Eligible for the next scheduled tick or a
    /// manual refresh; never retried immediately.
    #[error("network error: {0}")]
    Network(String),

    /// Upstream 5xx, handled like a transient network failure.
    #[error("server error: status {status}")]
    Server { status: u16 },

    /// The payload failed to parse into the expected shape. Treated as a
    /// source-level failure; the stale snapshot is retained.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failure acknowledging read receipts upstream. The optimistic local flag
/// has already been applied by the time one of these is returned.
#[derive(Debug, Error)]
pub enum AckError {
    /// A single-notice receipt failed.
    #[error("read receipt for {key} failed: {source}")]
    Receipt { key: NoticeKey, source: FetchError },

    /// The bulk receipt endpoint failed.
    #[error("bulk read receipt for {category} failed: {source}")]
    Bulk {
        category: SourceCategory,
        source: FetchError,
    },

    /// Some of the per-id fallback receipts failed.
    #[error("{failed} of {attempted} read receipts for {category} failed")]
    Partial {
        category: SourceCategory,
        attempted: usize,
        failed: usize,
        errors: Vec<(i64, FetchError)>,
    },
}

/// Engine lifecycle and mutation errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine already started")]
    AlreadyStarted,

    #[error("engine is stopped")]
    Stopped,

    #[error("unknown notice: {0}")]
    UnknownNotice(NoticeKey),

    #[error(transparent)]
    Ack(#[from] AckError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Server { status: 503 };
        assert!(err.to_string().contains("503"));

        let err = FetchError::Network("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = FetchError::Malformed("expected array".to_string());
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_ack_error_display_names_the_notice() {
        let err = AckError::Receipt {
            key: NoticeKey::new(SourceCategory::DirectNotification, 9),
            source: FetchError::Unauthorized,
        };
        let msg = err.to_string();
        assert!(msg.contains("direct-notification/9"));
        assert!(msg.contains("unauthorized"));
    }

    #[test]
    fn test_partial_ack_error_reports_counts() {
        let err = AckError::Partial {
            category: SourceCategory::GeneralAnnouncement,
            attempted: 5,
            failed: 2,
            errors: vec![(3, FetchError::Server { status: 500 })],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 of 5"));
        assert!(msg.contains("general-announcement"));
    }
}
