//! Pure filtering and display ordering over the merged feed.
//!
//! [`apply_at`] evaluates a [`FilterState`] against a collection without
//! side effects or mutation; renderers call it on every published snapshot
//! to derive their view.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DateRangeFilter, FilterState, Notice, ReadStatusFilter};

/// Apply `filter` to `notices`, evaluating date clauses against `now`.
///
/// Pure and order-preserving: returns a filtered copy with input order
/// intact, leaving the input untouched.
pub fn apply_at(notices: &[Notice], filter: &FilterState, now: DateTime<Utc>) -> Vec<Notice> {
    notices
        .iter()
        .filter(|notice| matches(notice, filter, now))
        .cloned()
        .collect()
}

/// [`apply_at`] evaluated at the current instant.
pub fn apply(notices: &[Notice], filter: &FilterState) -> Vec<Notice> {
    apply_at(notices, filter, Utc::now())
}

/// Sort for display: pinned notices first, then newest first. The sort is
/// stable, so ties on `published_at` keep snapshot order.
pub fn sort_for_display(notices: &mut [Notice]) {
    notices.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then(b.published_at.cmp(&a.published_at))
    });
}

fn matches(notice: &Notice, filter: &FilterState, now: DateTime<Utc>) -> bool {
    if !filter.include_expired && notice.is_expired(now) {
        return false;
    }

    match filter.read_status {
        ReadStatusFilter::All => {}
        ReadStatusFilter::Read if !notice.read => return false,
        ReadStatusFilter::Unread if notice.read => return false,
        _ => {}
    }

    match filter.date_range {
        DateRangeFilter::All => {}
        DateRangeFilter::Today => {
            if notice.published_at.date_naive() != now.date_naive() {
                return false;
            }
        }
        DateRangeFilter::Last7Days => {
            if !within_days(notice.published_at, now, 7) {
                return false;
            }
        }
        DateRangeFilter::Last30Days => {
            if !within_days(notice.published_at, now, 30) {
                return false;
            }
        }
    }

    let query = filter.search.trim();
    if !query.is_empty() && !matches_search(notice, query) {
        return false;
    }

    true
}

fn within_days(published_at: DateTime<Utc>, now: DateTime<Utc>, days: i64) -> bool {
    now.signed_duration_since(published_at) <= Duration::days(days)
}

/// Case-insensitive substring match over every searchable field; any field
/// matching suffices.
fn matches_search(notice: &Notice, query: &str) -> bool {
    let needle = query.to_lowercase();
    let field_matches = |field: &str| field.to_lowercase().contains(&needle);

    field_matches(&notice.title)
        || field_matches(&notice.message)
        || notice.tags.iter().any(|tag| field_matches(tag))
        || notice.category.as_deref().is_some_and(field_matches)
        || notice.exam_title.as_deref().is_some_and(field_matches)
        || notice.exam_code.as_deref().is_some_and(field_matches)
}
