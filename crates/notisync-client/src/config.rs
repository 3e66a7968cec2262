//! Portal connection configuration.

use std::env;

use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://portal.openexams.org/api";

/// Configuration errors. A missing bearer token is fatal: the auth
/// collaborator must provide one before the engine starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("{var} is not a valid integer: {value}")]
    InvalidStudentId { var: &'static str, value: String },
}

/// Connection settings for the student portal REST API.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the portal API, without a trailing slash.
    pub base_url: String,
    /// Bearer token for every request.
    pub bearer_token: String,
    /// Student the announcement feed is scoped to.
    pub student_id: i64,
}

impl PortalConfig {
    /// Create a config for a specific portal.
    pub fn new(base_url: &str, bearer_token: &str, student_id: i64) -> Self {
        PortalConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
            student_id,
        }
    }

    /// Create a config from environment variables: `NOTISYNC_API_URL`
    /// (optional), `NOTISYNC_TOKEN` and `NOTISYNC_STUDENT_ID` (required).
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            env::var("NOTISYNC_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let bearer_token = env::var("NOTISYNC_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingVar("NOTISYNC_TOKEN"))?;

        let raw_student_id = env::var("NOTISYNC_STUDENT_ID")
            .map_err(|_| ConfigError::MissingVar("NOTISYNC_STUDENT_ID"))?;
        let student_id = raw_student_id
            .parse()
            .map_err(|_| ConfigError::InvalidStudentId {
                var: "NOTISYNC_STUDENT_ID",
                value: raw_student_id,
            })?;

        Ok(Self::new(&base_url, &bearer_token, student_id))
    }

    /// Replace the bearer token (e.g. after the auth collaborator
    /// refreshes it).
    pub fn with_token(mut self, token: &str) -> Self {
        self.bearer_token = token.to_string();
        self
    }
}
