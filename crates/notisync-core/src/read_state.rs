//! Optimistic read-state ledger.
//!
//! [`ReadLedger`] layers local read-state assignments over the
//! server-reported values carried in each fetched snapshot. It never keeps
//! its own unread counter; counts are always recomputed from the annotated
//! collection, so they cannot drift from the source of truth.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{Notice, NoticeKey, SourceCategory};

/// What happens to the optimistic local flag when the upstream
/// acknowledgement fails.
///
/// The upstream treats read receipts as best-effort, so the default keeps
/// the local value rather than flickering a user-visible state back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Keep the optimistic value and report the failure to the caller.
    #[default]
    KeepLocal,
    /// Restore the pre-mutation value before reporting the failure.
    RevertOnFailure,
}

/// Local read-state overrides keyed by notice identity.
///
/// `set` accepts arbitrary boolean assignment: the default UI flow only
/// flips false to true, but server-driven rollback must stay correct.
#[derive(Debug, Default)]
pub struct ReadLedger {
    overrides: HashMap<NoticeKey, bool>,
}

impl ReadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local read-state assignment for `key`.
    pub fn set(&mut self, key: NoticeKey, read: bool) {
        self.overrides.insert(key, read);
    }

    /// Drop the local override for `key`, falling back to the server value.
    pub fn clear(&mut self, key: NoticeKey) {
        self.overrides.remove(&key);
    }

    /// Locally-known value for `key`, if one has been recorded.
    pub fn get(&self, key: &NoticeKey) -> Option<bool> {
        self.overrides.get(key).copied()
    }

    /// Overlay local overrides onto a merged snapshot.
    pub fn annotate(&self, notices: &mut [Notice]) {
        if self.overrides.is_empty() {
            return;
        }
        for notice in notices.iter_mut() {
            if let Some(read) = self.overrides.get(&notice.key()) {
                notice.read = *read;
            }
        }
    }

    /// Forget overrides for keys no longer present in the merge
    /// (snapshot-implied deletion).
    pub fn retain_keys(&mut self, live: &HashSet<NoticeKey>) {
        self.overrides.retain(|key, _| live.contains(key));
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Unread count for one category, recomputed from the collection.
pub fn unread_count(notices: &[Notice], category: SourceCategory) -> usize {
    notices
        .iter()
        .filter(|n| n.source == category && !n.read)
        .count()
}

/// Ids of unread notices in one category, in collection order.
pub fn unread_ids(notices: &[Notice], category: SourceCategory) -> Vec<i64> {
    notices
        .iter()
        .filter(|n| n.source == category && !n.read)
        .map(|n| n.id)
        .collect()
}
