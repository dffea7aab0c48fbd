//! Async Operations
//!
//! Background status fetching. Each task reports back over an unbounded
//! channel to the host loop, which is the only place the engine is mutated.
//!
//! ```text
//! ┌──────────────────┐          ┌──────────────────┐
//! │    Host loop     │          │  Fetch / poller  │
//! │      (App)       │          │      tasks       │
//! │                  │  spawn   │                  │
//! │  effects ─────────────────▶ │  provider        │
//! │                  │          │                  │
//! │  status_rx ◀──────────────── │  status_tx       │
//! └──────────────────┘          └──────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::engine::FetchKind;
use crate::status::{StatusError, StatusProvider, StatusSnapshot};

/// A finished fetch, tagged with the authentication it belongs to
#[derive(Debug)]
pub struct StatusUpdate {
    pub epoch: u64,
    pub kind: FetchKind,
    pub result: Result<StatusSnapshot, StatusError>,
}

/// Fetch once and report the result as [`FetchKind::Login`]
pub fn spawn_fetch(
    provider: Arc<dyn StatusProvider>,
    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    epoch: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Status fetch for epoch {}", epoch);
        let result = provider.fetch_status().await;
        // The receiver is gone after a reload; nothing to report to
        let _ = status_tx.send(StatusUpdate {
            epoch,
            kind: FetchKind::Login,
            result,
        });
    })
}

/// Fetch every `every`, starting one period from now, until aborted or the
/// receiver is dropped
pub fn spawn_poller(
    provider: Arc<dyn StatusProvider>,
    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    epoch: u64,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Status polling every {:?} (epoch {})", every, epoch);
        let mut interval = time::interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let result = provider.fetch_status().await;
            let update = StatusUpdate {
                epoch,
                kind: FetchKind::Poll,
                result,
            };
            if status_tx.send(update).is_err() {
                debug!("Status receiver closed, poller exiting");
                break;
            }
        }
    })
}

/// The single running poll loop, if any
#[derive(Default)]
pub struct Poller {
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any running loop with a new one
    pub fn start(
        &mut self,
        provider: Arc<dyn StatusProvider>,
        status_tx: mpsc::UnboundedSender<StatusUpdate>,
        epoch: u64,
        every: Duration,
    ) {
        self.stop();
        self.handle = Some(spawn_poller(provider, status_tx, epoch, every));
    }

    /// Abort the running loop
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Stopping status polling");
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
