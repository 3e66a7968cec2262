//! In-memory fakes for the adapter traits (testing only)
//!
//! Provides `ScriptedSource` and `RecordingReceipts` that satisfy the trait
//! contracts without any network dependency, plus a bare-bones notice
//! constructor for fixtures.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::adapter::{ReadReceipts, SourceAdapter};
use crate::domain::{FetchError, Notice, NoticeKey, SourceCategory};

/// Minimal notice fixture. `published_at` is offset by `id` minutes from a
/// fixed instant so distinct ids get distinct, deterministic timestamps.
pub fn notice(source: SourceCategory, id: i64, title: &str) -> Notice {
    Notice {
        id,
        source,
        title: title.to_string(),
        message: format!("{title} body"),
        audience: None,
        priority: None,
        category: None,
        tags: Vec::new(),
        is_pinned: false,
        exam_id: None,
        exam_title: None,
        exam_code: None,
        published_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(id),
        expires_at: None,
        read: false,
    }
}

/// Scripted source adapter: pops one queued response per fetch and repeats
/// the final response once the script is exhausted. An empty script serves
/// empty snapshots.
pub struct ScriptedSource {
    category: SourceCategory,
    script: Mutex<VecDeque<Result<Vec<Notice>, FetchError>>>,
    last_served: Mutex<Result<Vec<Notice>, FetchError>>,
    fetch_count: Mutex<usize>,
}

impl ScriptedSource {
    pub fn new(category: SourceCategory) -> Self {
        Self {
            category,
            script: Mutex::new(VecDeque::new()),
            last_served: Mutex::new(Ok(Vec::new())),
            fetch_count: Mutex::new(0),
        }
    }

    /// Builder-style: queue one response.
    pub fn respond_with(self, result: Result<Vec<Notice>, FetchError>) -> Self {
        self.push(result);
        self
    }

    /// Queue one response mid-test.
    pub fn push(&self, result: Result<Vec<Notice>, FetchError>) {
        self.script.lock().unwrap().push_back(result);
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }
}

#[async_trait]
impl SourceAdapter for ScriptedSource {
    fn category(&self) -> SourceCategory {
        self.category
    }

    async fn fetch(&self) -> Result<Vec<Notice>, FetchError> {
        *self.fetch_count.lock().unwrap() += 1;
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => {
                *self.last_served.lock().unwrap() = result.clone();
                result
            }
            None => self.last_served.lock().unwrap().clone(),
        }
    }
}

/// Records acknowledgement calls; optionally scripted to fail them all.
#[derive(Default)]
pub struct RecordingReceipts {
    acknowledged: Mutex<Vec<NoticeKey>>,
    bulk_calls: Mutex<usize>,
    fail_with: Mutex<Option<FetchError>>,
}

impl RecordingReceipts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent acknowledgement fail with `error`, or succeed
    /// again when `None`.
    pub fn fail_with(&self, error: Option<FetchError>) {
        *self.fail_with.lock().unwrap() = error;
    }

    /// Keys acknowledged so far, in call order.
    pub fn acknowledged(&self) -> Vec<NoticeKey> {
        self.acknowledged.lock().unwrap().clone()
    }

    /// Number of bulk acknowledgement calls.
    pub fn bulk_calls(&self) -> usize {
        *self.bulk_calls.lock().unwrap()
    }
}

#[async_trait]
impl ReadReceipts for RecordingReceipts {
    async fn acknowledge(&self, key: NoticeKey) -> Result<(), FetchError> {
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        self.acknowledged.lock().unwrap().push(key);
        Ok(())
    }

    async fn acknowledge_all_direct(&self) -> Result<(), FetchError> {
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        *self.bulk_calls.lock().unwrap() += 1;
        Ok(())
    }
}
