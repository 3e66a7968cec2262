//! Filter state for the merged feed.

use serde::{Deserialize, Serialize};

/// Read-status clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStatusFilter {
    #[default]
    All,
    Read,
    Unread,
}

/// Date-range clause, evaluated against `published_at` at filter time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeFilter {
    #[default]
    All,
    /// Same UTC calendar day as the evaluation instant.
    Today,
    Last7Days,
    Last30Days,
}

/// Composable predicate over the merged feed. Clauses combine
/// conjunctively; an empty search string matches everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub read_status: ReadStatusFilter,
    pub date_range: DateRangeFilter,
    /// Case-insensitive substring matched against title, message, tags,
    /// category, and the denormalized exam title/code fields.
    pub search: String,
    /// The default view never surfaces expired notices.
    pub include_expired: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            read_status: ReadStatusFilter::All,
            date_range: DateRangeFilter::All,
            search: String::new(),
            include_expired: false,
        }
    }
}

impl FilterState {
    /// Filter selecting only unread notices.
    pub fn unread_only() -> Self {
        Self {
            read_status: ReadStatusFilter::Unread,
            ..Self::default()
        }
    }
}
