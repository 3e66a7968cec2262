//! HTTP client for the student portal REST API.

use notisync_core::FetchError;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::config::PortalConfig;
use crate::wire::{AnnouncementRecord, NotificationRecord};

/// Thin reqwest wrapper owning the bearer token and the endpoint layout.
///
/// Every call is a single request: retries are left to the engine's next
/// scheduled tick or a manual refresh.
pub struct PortalClient {
    config: PortalConfig,
    http: reqwest::Client,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("notisync/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        PortalClient { config, http }
    }

    /// Full announcement snapshot for the configured student, both
    /// audiences in one payload.
    pub async fn student_notifications(&self) -> Result<Vec<AnnouncementRecord>, FetchError> {
        let url = format!("{}/student/notifications", self.config.base_url);
        let records: Vec<AnnouncementRecord> = self
            .get_json(&url, &[("student_id", self.config.student_id.to_string())])
            .await?;
        debug!(event = "portal.announcements_fetched", count = records.len());
        Ok(records)
    }

    /// Full direct-notification snapshot.
    pub async fn general_notifications(&self) -> Result<Vec<NotificationRecord>, FetchError> {
        let url = format!("{}/general-notifications", self.config.base_url);
        let records: Vec<NotificationRecord> = self.get_json(&url, &[]).await?;
        debug!(event = "portal.notifications_fetched", count = records.len());
        Ok(records)
    }

    /// Acknowledge one announcement as read.
    pub async fn mark_announcement_read(&self, announcement_id: i64) -> Result<(), FetchError> {
        let url = format!("{}/announcements/mark-as-read", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.bearer_token)
            .json(&json!({ "announcement_id": announcement_id }))
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).map(|_| ())
    }

    /// Acknowledge one direct notification as read.
    pub async fn mark_notification_read(&self, id: i64) -> Result<(), FetchError> {
        let url = format!(
            "{}/general-notifications/{}/mark-as-read",
            self.config.base_url, id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).map(|_| ())
    }

    /// Bulk-acknowledge every direct notification.
    pub async fn mark_all_notifications_read(&self) -> Result<(), FetchError> {
        let url = format!(
            "{}/general-notifications/mark-all-as-read",
            self.config.base_url
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response)?;
        response
            .json::<T>()
            .await
            .map_err(|error| FetchError::Malformed(error.to_string()))
    }
}

/// Map an HTTP status to the fetch error taxonomy; `None` for success.
pub(crate) fn classify_status(status: u16) -> Option<FetchError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(FetchError::Unauthorized),
        500..=599 => Some(FetchError::Server { status }),
        other => Some(FetchError::Network(format!("unexpected status {other}"))),
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    match classify_status(response.status().as_u16()) {
        None => Ok(response),
        Some(error) => Err(error),
    }
}

fn transport_error(error: reqwest::Error) -> FetchError {
    if error.is_decode() {
        FetchError::Malformed(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}
