//! Canonical notice model shared by every source adapter.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin of a notice.
///
/// Raw upstream ids are only unique within one category, so engine-wide
/// identity is always [`NoticeKey`], never the bare id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceCategory {
    GeneralAnnouncement,
    ExamAnnouncement,
    DirectNotification,
}

impl SourceCategory {
    /// All categories, in the order sub-collections are concatenated.
    pub const ALL: [SourceCategory; 3] = [
        SourceCategory::GeneralAnnouncement,
        SourceCategory::ExamAnnouncement,
        SourceCategory::DirectNotification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCategory::GeneralAnnouncement => "general-announcement",
            SourceCategory::ExamAnnouncement => "exam-announcement",
            SourceCategory::DirectNotification => "direct-notification",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal priority attached to announcements. Absent for direct
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Parse an upstream priority string. Unknown values map to `None`
    /// rather than failing the record.
    pub fn parse(raw: &str) -> Option<Priority> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

/// Engine-wide identity of a notice: `(source, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoticeKey {
    pub source: SourceCategory,
    pub id: i64,
}

impl NoticeKey {
    pub fn new(source: SourceCategory, id: i64) -> Self {
        Self { source, id }
    }
}

impl fmt::Display for NoticeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.id)
    }
}

/// Unified notice produced by every source adapter.
///
/// Identity never changes after ingestion. The `read` field carries the
/// server's last-known value at fetch time; the read-state ledger may
/// overlay a newer optimistic value before the notice reaches a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Upstream id, unique within `source` only.
    pub id: i64,

    /// Category assigned at ingestion.
    pub source: SourceCategory,

    pub title: String,

    pub message: String,

    /// Scope tag reported by announcement sources (`"all"`,
    /// `"exam-specific"`).
    pub audience: Option<String>,

    pub priority: Option<Priority>,

    /// Classification metadata, announcements only.
    pub category: Option<String>,

    pub tags: Vec<String>,

    /// Pinned notices float to the top of the display order.
    pub is_pinned: bool,

    /// Denormalized exam reference. Resolving `exam_id` to full exam detail
    /// is a collaborator's job, not this engine's.
    pub exam_id: Option<i64>,

    pub exam_title: Option<String>,

    pub exam_code: Option<String>,

    /// Effective timestamp used for sorting and date filtering:
    /// `publish_date` if present, else creation time, else ingestion time.
    pub published_at: DateTime<Utc>,

    /// Notices past this instant are excluded by the default filter.
    pub expires_at: Option<DateTime<Utc>>,

    pub read: bool,
}

impl Notice {
    pub fn key(&self) -> NoticeKey {
        NoticeKey::new(self.source, self.id)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry < now)
    }
}
