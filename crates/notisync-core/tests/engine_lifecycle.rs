//! Engine lifecycle tests: refresh coalescing, stop-time result discard,
//! and start/stop misuse.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use notisync_core::fakes::{notice, RecordingReceipts, ScriptedSource};
use notisync_core::{
    EngineConfig, EngineError, FetchError, Notice, NoticeKey, ReadReceipts, RefreshOutcome,
    SourceAdapter, SourceCategory, SyncEngine,
};
use tokio::sync::Semaphore;

/// Adapter that blocks each fetch until the test releases a permit.
struct GatedSource {
    category: SourceCategory,
    gate: Arc<Semaphore>,
    snapshot: Vec<Notice>,
}

#[async_trait]
impl SourceAdapter for GatedSource {
    fn category(&self) -> SourceCategory {
        self.category
    }

    async fn fetch(&self) -> Result<Vec<Notice>, FetchError> {
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        Ok(self.snapshot.clone())
    }
}

fn gated_engine(gate: Arc<Semaphore>) -> SyncEngine {
    let source = GatedSource {
        category: SourceCategory::GeneralAnnouncement,
        gate,
        snapshot: vec![notice(SourceCategory::GeneralAnnouncement, 1, "gated")],
    };
    SyncEngine::new(
        vec![Arc::new(source) as Arc<dyn SourceAdapter>],
        Arc::new(RecordingReceipts::new()) as Arc<dyn ReadReceipts>,
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn overlapping_refreshes_are_coalesced_not_queued() {
    let gate = Arc::new(Semaphore::new(0));
    let engine = Arc::new(gated_engine(Arc::clone(&gate)));

    let background = Arc::clone(&engine);
    let first = tokio::spawn(async move { background.refresh_now().await });

    // Let the first refresh reach its gated fetch.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(engine.refresh_now().await, RefreshOutcome::Coalesced);

    gate.add_permits(1);
    assert_eq!(first.await.unwrap(), RefreshOutcome::Completed);
    assert_eq!(engine.current_view().notices.len(), 1);

    // With nothing in flight a refresh runs again.
    gate.add_permits(1);
    assert_eq!(engine.refresh_now().await, RefreshOutcome::Completed);
}

#[tokio::test]
async fn stop_discards_results_of_in_flight_fetches() {
    let gate = Arc::new(Semaphore::new(0));
    let engine = gated_engine(Arc::clone(&gate));

    engine.start().unwrap();
    // The initial tick is now blocked inside the adapter.
    tokio::time::sleep(Duration::from_millis(20)).await;

    engine.stop();
    gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The late-arriving snapshot was discarded: no mutation after stop.
    let view = engine.current_view();
    assert!(view.notices.is_empty());
    assert!(!view.first_load_complete);
}

#[tokio::test]
async fn lifecycle_misuse_is_rejected() {
    let source = ScriptedSource::new(SourceCategory::GeneralAnnouncement);
    let engine = SyncEngine::new(
        vec![Arc::new(source) as Arc<dyn SourceAdapter>],
        Arc::new(RecordingReceipts::new()) as Arc<dyn ReadReceipts>,
        EngineConfig::default(),
    );

    engine.start().unwrap();
    assert!(matches!(engine.start(), Err(EngineError::AlreadyStarted)));

    engine.stop();
    assert!(matches!(engine.start(), Err(EngineError::Stopped)));
    assert_eq!(engine.refresh_now().await, RefreshOutcome::Stopped);
    assert!(matches!(
        engine
            .mark_read(NoticeKey::new(SourceCategory::GeneralAnnouncement, 1))
            .await,
        Err(EngineError::Stopped)
    ));
}

#[tokio::test]
async fn empty_error_state_only_when_every_source_fails_on_first_load() {
    let general = ScriptedSource::new(SourceCategory::GeneralAnnouncement)
        .respond_with(Err(FetchError::Network("unreachable".to_string())));
    let exam = ScriptedSource::new(SourceCategory::ExamAnnouncement)
        .respond_with(Err(FetchError::Server { status: 500 }));
    let direct = ScriptedSource::new(SourceCategory::DirectNotification)
        .respond_with(Err(FetchError::Unauthorized));

    let engine = SyncEngine::new(
        vec![
            Arc::new(general) as Arc<dyn SourceAdapter>,
            Arc::new(exam) as Arc<dyn SourceAdapter>,
            Arc::new(direct) as Arc<dyn SourceAdapter>,
        ],
        Arc::new(RecordingReceipts::new()) as Arc<dyn ReadReceipts>,
        EngineConfig::default(),
    );

    assert_eq!(engine.refresh_now().await, RefreshOutcome::Completed);
    let view = engine.current_view();
    assert!(view.notices.is_empty());
    assert_eq!(view.source_errors.len(), 3);
    assert!(view.all_sources_down());
    assert!(view.first_load_complete);
}

#[tokio::test]
async fn manual_refresh_never_arms_the_badge() {
    let general = ScriptedSource::new(SourceCategory::GeneralAnnouncement)
        .respond_with(Ok(vec![notice(
            SourceCategory::GeneralAnnouncement,
            1,
            "first",
        )]))
        .respond_with(Ok(vec![
            notice(SourceCategory::GeneralAnnouncement, 1, "first"),
            notice(SourceCategory::GeneralAnnouncement, 2, "second"),
        ]));

    let engine = SyncEngine::new(
        vec![Arc::new(general) as Arc<dyn SourceAdapter>],
        Arc::new(RecordingReceipts::new()) as Arc<dyn ReadReceipts>,
        EngineConfig::default(),
    );

    engine.refresh_now().await;
    engine.refresh_now().await;

    let view = engine.current_view();
    assert_eq!(view.notices.len(), 2);
    // One notice genuinely appeared, but manual refreshes never badge it.
    assert_eq!(view.new_items, 0);
}
