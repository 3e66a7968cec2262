//! Source adapter and read-receipt implementations over the portal client.
//!
//! Three production adapters feed the engine: two over the announcement
//! endpoint (split by audience client-side) and one over the
//! direct-notification endpoint. All share one [`PortalClient`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use notisync_core::{FetchError, Notice, NoticeKey, ReadReceipts, SourceAdapter, SourceCategory};
use tracing::debug;

use crate::client::PortalClient;

/// Announcement-backed adapter, one instance per audience split.
pub struct AnnouncementSource {
    client: Arc<PortalClient>,
    category: SourceCategory,
}

impl AnnouncementSource {
    /// Adapter for announcements addressed to everyone.
    pub fn general(client: Arc<PortalClient>) -> Self {
        Self {
            client,
            category: SourceCategory::GeneralAnnouncement,
        }
    }

    /// Adapter for `"exam-specific"` announcements.
    pub fn exam(client: Arc<PortalClient>) -> Self {
        Self {
            client,
            category: SourceCategory::ExamAnnouncement,
        }
    }
}

#[async_trait]
impl SourceAdapter for AnnouncementSource {
    fn category(&self) -> SourceCategory {
        self.category
    }

    async fn fetch(&self) -> Result<Vec<Notice>, FetchError> {
        let fetched_at = Utc::now();
        let records = self.client.student_notifications().await?;
        let notices: Vec<Notice> = records
            .into_iter()
            .filter(|record| record.source_category() == self.category)
            .map(|record| record.into_notice(fetched_at))
            .collect();
        debug!(event = "source.fetched", category = %self.category, count = notices.len());
        Ok(notices)
    }
}

/// Direct-notification adapter.
pub struct DirectNotificationSource {
    client: Arc<PortalClient>,
}

impl DirectNotificationSource {
    pub fn new(client: Arc<PortalClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for DirectNotificationSource {
    fn category(&self) -> SourceCategory {
        SourceCategory::DirectNotification
    }

    async fn fetch(&self) -> Result<Vec<Notice>, FetchError> {
        let fetched_at = Utc::now();
        let records = self.client.general_notifications().await?;
        let notices: Vec<Notice> = records
            .into_iter()
            .map(|record| record.into_notice(fetched_at))
            .collect();
        debug!(event = "source.fetched", category = %self.category(), count = notices.len());
        Ok(notices)
    }
}

/// Read receipts routed to the per-category upstream endpoints.
pub struct PortalReceipts {
    client: Arc<PortalClient>,
}

impl PortalReceipts {
    pub fn new(client: Arc<PortalClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReadReceipts for PortalReceipts {
    async fn acknowledge(&self, key: NoticeKey) -> Result<(), FetchError> {
        match key.source {
            SourceCategory::GeneralAnnouncement | SourceCategory::ExamAnnouncement => {
                self.client.mark_announcement_read(key.id).await
            }
            SourceCategory::DirectNotification => {
                self.client.mark_notification_read(key.id).await
            }
        }
    }

    async fn acknowledge_all_direct(&self) -> Result<(), FetchError> {
        self.client.mark_all_notifications_read().await
    }
}

/// Wire the three production adapters and the receipt router over one
/// shared client, ready to hand to `SyncEngine::new`.
pub fn production_sources(
    client: Arc<PortalClient>,
) -> (Vec<Arc<dyn SourceAdapter>>, Arc<dyn ReadReceipts>) {
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(AnnouncementSource::general(Arc::clone(&client))),
        Arc::new(AnnouncementSource::exam(Arc::clone(&client))),
        Arc::new(DirectNotificationSource::new(Arc::clone(&client))),
    ];
    (adapters, Arc::new(PortalReceipts::new(client)))
}
