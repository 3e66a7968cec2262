//! REST source adapters for the notisync engine.
//!
//! Connects the engine to the student portal's three bearer-token
//! authenticated JSON sources and its read-receipt endpoints. Typical
//! wiring:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use notisync_client::{production_sources, PortalClient, PortalConfig};
//! use notisync_core::{EngineConfig, SyncEngine};
//!
//! let client = Arc::new(PortalClient::new(PortalConfig::from_env()?));
//! let (adapters, receipts) = production_sources(client);
//! let engine = SyncEngine::new(adapters, receipts, EngineConfig::default());
//! engine.start()?;
//! ```

pub mod adapters;
pub mod client;
pub mod config;
pub mod wire;

pub use adapters::{
    production_sources, AnnouncementSource, DirectNotificationSource, PortalReceipts,
};
pub use client::PortalClient;
pub use config::{ConfigError, PortalConfig};
pub use wire::{AnnouncementRecord, NotificationRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
