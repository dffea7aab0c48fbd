//! Status feed
//!
//! Model and adapter for the external component-health feed. The engine
//! only reads the latest snapshot through [`StatusBoard`]; fetching is done
//! by a [`StatusProvider`] on the host's schedule.

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use http::HttpStatusProvider;

/// Statuses that count as warnings (compared case-sensitively)
pub const WARNING_STATUSES: [&str; 2] = ["degraded_performance", "major_outage"];

/// Status provider failures
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Health of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: String,
    pub status: String,
}

impl ComponentStatus {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Whether this component is degraded or down
    pub fn is_warning(&self) -> bool {
        WARNING_STATUSES.contains(&self.status.as_str())
    }

    /// `<name>: <STATUS>`
    pub fn display_line(&self) -> String {
        format!("{}: {}", self.name, self.status.to_uppercase())
    }
}

/// One fetch of the feed, in feed order.
/// Deserialises from `{ "components": [ { "name", "status" }, ... ] }`;
/// unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub components: Vec<ComponentStatus>,
}

impl StatusSnapshot {
    pub fn new(components: Vec<ComponentStatus>) -> Self {
        Self { components }
    }

    /// Components in a warning state
    pub fn warnings(&self) -> impl Iterator<Item = &ComponentStatus> {
        self.components.iter().filter(|c| c.is_warning())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    /// One display line per component
    pub fn display_lines(&self) -> Vec<String> {
        self.components.iter().map(ComponentStatus::display_line).collect()
    }
}

/// Source of status snapshots
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Fetch the current snapshot
    async fn fetch_status(&self) -> Result<StatusSnapshot, StatusError>;
}

/// Holder of the most recent snapshot
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    snapshot: Option<StatusSnapshot>,
    updated_at: Option<DateTime<Utc>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a fetch result: success replaces the snapshot, failure clears it
    pub fn record(&mut self, result: Result<StatusSnapshot, StatusError>) {
        match result {
            Ok(snapshot) => {
                debug!("Status snapshot updated ({} components)", snapshot.components.len());
                self.snapshot = Some(snapshot);
                self.updated_at = Some(Utc::now());
            }
            Err(e) => {
                warn!("Status fetch failed: {}", e);
                self.clear();
            }
        }
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        self.updated_at = None;
    }
}
