//! Wire-format records and their normalization into the shared notice
//! shape.
//!
//! The announcement endpoint returns both audiences in one payload; the
//! split into general and exam categories happens client-side via
//! [`AnnouncementRecord::source_category`]. Timestamp fields are parsed
//! leniently: an unparseable date never fails the snapshot, the field is
//! just treated as absent.

use chrono::{DateTime, NaiveDate, Utc};
use notisync_core::{Notice, Priority, SourceCategory};
use serde::{Deserialize, Deserializer};

/// Audience tag selecting the exam-announcement category. Everything else,
/// including unknown tags, lands in general announcements.
const EXAM_SPECIFIC_AUDIENCE: &str = "exam-specific";

/// Raw announcement record from `GET /student/notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementRecord {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub exam_id: Option<i64>,
    #[serde(default)]
    pub exam_title: Option<String>,
    #[serde(default)]
    pub exam_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_pinned: Option<bool>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_read: Option<bool>,
}

impl AnnouncementRecord {
    /// Category this record lands in after the client-side audience split.
    pub fn source_category(&self) -> SourceCategory {
        match self.audience.as_deref() {
            Some(EXAM_SPECIFIC_AUDIENCE) => SourceCategory::ExamAnnouncement,
            _ => SourceCategory::GeneralAnnouncement,
        }
    }

    /// Normalize into the shared notice shape. `fetched_at` terminates the
    /// published-at fallback chain (publish_date, then created_at).
    pub fn into_notice(self, fetched_at: DateTime<Utc>) -> Notice {
        let source = self.source_category();
        Notice {
            id: self.id,
            source,
            title: self.title,
            message: self.message,
            audience: self.audience,
            priority: self.priority.as_deref().and_then(Priority::parse),
            category: self.category,
            tags: self.tags.unwrap_or_default(),
            is_pinned: self.is_pinned.unwrap_or(false),
            exam_id: self.exam_id,
            exam_title: self.exam_title,
            exam_code: self.exam_code,
            published_at: self.publish_date.or(self.created_at).unwrap_or(fetched_at),
            expires_at: self.expiry_date,
            read: self.is_read.unwrap_or(false),
        }
    }
}

/// Raw direct-notification record from `GET /general-notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub exam_id: Option<i64>,
    #[serde(default)]
    pub is_for_all: bool,
    #[serde(default)]
    pub is_read: Option<bool>,
    #[serde(default)]
    pub exam_title: Option<String>,
    #[serde(default)]
    pub exam_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    /// Normalize into the shared notice shape. Direct notifications carry
    /// no audience, priority, or classification metadata.
    pub fn into_notice(self, fetched_at: DateTime<Utc>) -> Notice {
        Notice {
            id: self.id,
            source: SourceCategory::DirectNotification,
            title: self.title,
            message: self.message,
            audience: None,
            priority: None,
            category: None,
            tags: Vec::new(),
            is_pinned: false,
            exam_id: self.exam_id,
            exam_title: self.exam_title,
            exam_code: self.exam_code,
            published_at: self.created_at.unwrap_or(fetched_at),
            expires_at: None,
            read: self.is_read.unwrap_or(false),
        }
    }
}

/// Parse an upstream timestamp: RFC 3339 first, then a bare
/// `YYYY-MM-DD` date taken as midnight UTC. `None` on anything else.
pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn announcement(value: serde_json::Value) -> AnnouncementRecord {
        serde_json::from_value(value).expect("announcement record")
    }

    #[test]
    fn audience_split_routes_exam_specific_records() {
        let general = announcement(json!({
            "id": 1, "title": "t", "message": "m", "audience": "all"
        }));
        let exam = announcement(json!({
            "id": 2, "title": "t", "message": "m", "audience": "exam-specific"
        }));
        let unknown = announcement(json!({
            "id": 3, "title": "t", "message": "m", "audience": "staff-only"
        }));
        let missing = announcement(json!({ "id": 4, "title": "t", "message": "m" }));

        assert_eq!(
            general.source_category(),
            SourceCategory::GeneralAnnouncement
        );
        assert_eq!(exam.source_category(), SourceCategory::ExamAnnouncement);
        assert_eq!(
            unknown.source_category(),
            SourceCategory::GeneralAnnouncement
        );
        assert_eq!(
            missing.source_category(),
            SourceCategory::GeneralAnnouncement
        );
    }

    #[test]
    fn announcement_normalization_maps_every_field() {
        let fetched_at = Utc::now();
        let record = announcement(json!({
            "id": 11,
            "title": "Venue change",
            "message": "Hall B instead of Hall A",
            "audience": "exam-specific",
            "exam_id": 42,
            "exam_title": "Linear Algebra",
            "exam_code": "MATH-201",
            "publish_date": "2026-05-01T09:30:00Z",
            "expiry_date": "2026-06-01T00:00:00Z",
            "priority": "HIGH",
            "category": "logistics",
            "tags": ["venue", "exam"],
            "is_pinned": true,
            "is_read": true
        }));

        let notice = record.into_notice(fetched_at);
        assert_eq!(notice.id, 11);
        assert_eq!(notice.source, SourceCategory::ExamAnnouncement);
        assert_eq!(notice.priority, Some(Priority::High));
        assert_eq!(notice.exam_id, Some(42));
        assert_eq!(notice.exam_code.as_deref(), Some("MATH-201"));
        assert_eq!(notice.tags, vec!["venue", "exam"]);
        assert!(notice.is_pinned);
        assert!(notice.read);
        assert_eq!(
            notice.published_at,
            "2026-05-01T09:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert!(notice.expires_at.is_some());
    }

    #[test]
    fn published_at_falls_back_to_created_at_then_fetch_time() {
        let fetched_at = Utc::now();

        let with_created = announcement(json!({
            "id": 1, "title": "t", "message": "m",
            "created_at": "2026-04-01T00:00:00Z"
        }));
        assert_eq!(
            with_created.into_notice(fetched_at).published_at,
            "2026-04-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );

        let bare = announcement(json!({ "id": 2, "title": "t", "message": "m" }));
        assert_eq!(bare.into_notice(fetched_at).published_at, fetched_at);
    }

    #[test]
    fn unknown_priority_normalizes_to_none() {
        let record = announcement(json!({
            "id": 1, "title": "t", "message": "m", "priority": "catastrophic"
        }));
        assert_eq!(record.into_notice(Utc::now()).priority, None);
    }

    #[test]
    fn unparseable_dates_are_treated_as_absent() {
        let record = announcement(json!({
            "id": 1, "title": "t", "message": "m",
            "publish_date": "next tuesday",
            "expiry_date": "soon"
        }));
        assert!(record.publish_date.is_none());
        assert!(record.expiry_date.is_none());
    }

    #[test]
    fn date_only_timestamps_parse_as_midnight_utc() {
        let parsed = parse_datetime("2026-05-03").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-05-03T00:00:00+00:00");
    }

    #[test]
    fn notification_normalization_fills_fixed_fields() {
        let fetched_at = Utc::now();
        let record: NotificationRecord = serde_json::from_value(json!({
            "id": 5,
            "title": "Payment received",
            "message": "Receipt attached",
            "is_for_all": false,
            "exam_id": 42,
            "created_at": "2026-05-02T08:00:00Z"
        }))
        .expect("notification record");

        let notice = record.into_notice(fetched_at);
        assert_eq!(notice.source, SourceCategory::DirectNotification);
        assert_eq!(notice.priority, None);
        assert!(notice.audience.is_none());
        assert!(notice.tags.is_empty());
        assert!(!notice.read);
        assert_eq!(notice.exam_id, Some(42));
    }
}
