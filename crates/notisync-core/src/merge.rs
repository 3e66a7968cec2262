//! Snapshot merging and delta computation.
//!
//! [`merge_sources`] folds one refresh cycle's per-source fetch results over
//! the previous per-category state: a successful snapshot replaces its
//! category's sub-collection wholesale, a failed fetch retains the previous
//! sub-collection, and the delta of newly-appeared keys drives the badge.

use std::collections::{HashMap, HashSet};

use crate::adapter::SourceFetch;
use crate::domain::{FetchError, Notice, NoticeKey, SourceCategory};

/// Per-category sub-collections of the merged feed.
pub type CategoryMap = HashMap<SourceCategory, Vec<Notice>>;

/// Outcome of merging one refresh cycle's fetches over the previous state.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Post-merge sub-collections.
    pub by_category: CategoryMap,

    /// Notices whose key is present after the merge but was absent before.
    pub added: Vec<Notice>,

    /// Sources whose fetch failed this cycle. Their previous sub-collection
    /// was retained unchanged, stale but present.
    pub failures: Vec<(SourceCategory, FetchError)>,
}

impl MergeOutcome {
    /// Concatenation of all category sub-collections, in
    /// [`SourceCategory::ALL`] order. Global sorting is the view's concern.
    pub fn merged(&self) -> Vec<Notice> {
        merged_notices(&self.by_category)
    }
}

/// Flatten a category map in [`SourceCategory::ALL`] order.
pub fn merged_notices(by_category: &CategoryMap) -> Vec<Notice> {
    let mut merged = Vec::new();
    for category in SourceCategory::ALL {
        if let Some(notices) = by_category.get(&category) {
            merged.extend(notices.iter().cloned());
        }
    }
    merged
}

/// Merge fetched snapshots over the previous per-category state.
///
/// Each successful fetch is authoritative for its own category: no partial
/// patching, the prior sub-collection is replaced wholesale. A failed fetch
/// keeps the prior sub-collection so one source outage never blanks the
/// rest of the feed. Duplicate keys within a snapshot keep the first
/// occurrence.
pub fn merge_sources(previous: &CategoryMap, fetched: Vec<SourceFetch>) -> MergeOutcome {
    let mut by_category = previous.clone();
    let mut failures = Vec::new();

    for fetch in fetched {
        match fetch.result {
            Ok(snapshot) => {
                by_category.insert(fetch.category, dedup_by_key(snapshot));
            }
            Err(error) => {
                by_category.entry(fetch.category).or_default();
                failures.push((fetch.category, error));
            }
        }
    }

    let prior_keys: HashSet<NoticeKey> = previous.values().flatten().map(Notice::key).collect();
    let added = by_category
        .values()
        .flatten()
        .filter(|notice| !prior_keys.contains(&notice.key()))
        .cloned()
        .collect();

    MergeOutcome {
        by_category,
        added,
        failures,
    }
}

fn dedup_by_key(snapshot: Vec<Notice>) -> Vec<Notice> {
    let mut seen = HashSet::new();
    snapshot
        .into_iter()
        .filter(|notice| seen.insert(notice.key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::notice;

    fn general(id: i64) -> Notice {
        notice(SourceCategory::GeneralAnnouncement, id, &format!("g{id}"))
    }

    fn exam(id: i64) -> Notice {
        notice(SourceCategory::ExamAnnouncement, id, &format!("e{id}"))
    }

    #[test]
    fn merging_an_unchanged_snapshot_twice_adds_nothing() {
        let first = merge_sources(
            &CategoryMap::new(),
            vec![SourceFetch::ok(
                SourceCategory::GeneralAnnouncement,
                vec![general(1), general(2)],
            )],
        );
        assert_eq!(first.added.len(), 2);

        let second = merge_sources(
            &first.by_category,
            vec![SourceFetch::ok(
                SourceCategory::GeneralAnnouncement,
                vec![general(1), general(2)],
            )],
        );
        assert!(second.added.is_empty());
        assert_eq!(second.merged(), first.merged());
    }

    #[test]
    fn duplicate_keys_within_a_snapshot_keep_the_first_occurrence() {
        let mut dup = general(1);
        dup.title = "duplicate".to_string();

        let outcome = merge_sources(
            &CategoryMap::new(),
            vec![SourceFetch::ok(
                SourceCategory::GeneralAnnouncement,
                vec![general(1), dup, general(2)],
            )],
        );

        let merged = outcome.merged();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "g1");
    }

    #[test]
    fn same_id_in_different_categories_is_not_a_duplicate() {
        let outcome = merge_sources(
            &CategoryMap::new(),
            vec![
                SourceFetch::ok(SourceCategory::GeneralAnnouncement, vec![general(7)]),
                SourceFetch::ok(SourceCategory::ExamAnnouncement, vec![exam(7)]),
            ],
        );
        assert_eq!(outcome.merged().len(), 2);
        assert_eq!(outcome.added.len(), 2);
    }

    #[test]
    fn failed_source_retains_previous_sub_collection() {
        let first = merge_sources(
            &CategoryMap::new(),
            vec![
                SourceFetch::ok(SourceCategory::GeneralAnnouncement, vec![general(1)]),
                SourceFetch::ok(SourceCategory::ExamAnnouncement, vec![exam(1)]),
            ],
        );

        let second = merge_sources(
            &first.by_category,
            vec![
                SourceFetch::ok(
                    SourceCategory::GeneralAnnouncement,
                    vec![general(1), general(2)],
                ),
                SourceFetch::failed(
                    SourceCategory::ExamAnnouncement,
                    FetchError::Server { status: 502 },
                ),
            ],
        );

        // The failed category is stale but present, the healthy one updated.
        assert_eq!(
            second.by_category[&SourceCategory::ExamAnnouncement],
            vec![exam(1)]
        );
        assert_eq!(
            second.by_category[&SourceCategory::GeneralAnnouncement].len(),
            2
        );
        assert_eq!(second.added.len(), 1);
        assert_eq!(second.failures.len(), 1);
        assert_eq!(
            second.failures[0],
            (
                SourceCategory::ExamAnnouncement,
                FetchError::Server { status: 502 }
            )
        );
    }

    #[test]
    fn notices_dropped_from_a_snapshot_disappear_from_the_merge() {
        let first = merge_sources(
            &CategoryMap::new(),
            vec![SourceFetch::ok(
                SourceCategory::GeneralAnnouncement,
                vec![general(1), general(2)],
            )],
        );

        let second = merge_sources(
            &first.by_category,
            vec![SourceFetch::ok(
                SourceCategory::GeneralAnnouncement,
                vec![general(2)],
            )],
        );

        let merged = second.merged();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 2);
        assert!(second.added.is_empty());
    }

    #[test]
    fn merged_concatenates_categories_in_declaration_order() {
        let outcome = merge_sources(
            &CategoryMap::new(),
            vec![
                SourceFetch::ok(
                    SourceCategory::DirectNotification,
                    vec![notice(SourceCategory::DirectNotification, 1, "n1")],
                ),
                SourceFetch::ok(SourceCategory::GeneralAnnouncement, vec![general(1)]),
            ],
        );

        let merged = outcome.merged();
        assert_eq!(merged[0].source, SourceCategory::GeneralAnnouncement);
        assert_eq!(merged[1].source, SourceCategory::DirectNotification);
    }
}
