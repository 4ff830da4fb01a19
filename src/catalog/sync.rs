//! Listener applying snapshots published by other sessions

use crate::catalog::CatalogStore;
use crate::core::events::{EventEnvelope, SyncBus, SyncEvent};
use crate::storage::SettingsService;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Applies sync events to this session's stores
///
/// Events published by the session itself are skipped. Everything else is
/// handed to the matching store, which keeps it only if its revision is newer
/// than the local one.
#[derive(Clone)]
pub struct SyncListener {
    catalog: Arc<CatalogStore>,
    settings: Option<Arc<SettingsService>>,
}

impl SyncListener {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self {
            catalog,
            settings: None,
        }
    }

    pub fn with_settings(mut self, settings: Arc<SettingsService>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Subscribe to `bus` and apply events in a background task
    ///
    /// The task ends when every sender of the bus has been dropped.
    pub fn spawn(self, bus: &SyncBus) -> JoinHandle<()> {
        let rx = bus.subscribe();
        tokio::spawn(async move { self.run(rx).await })
    }

    pub async fn run(&self, mut rx: broadcast::Receiver<EventEnvelope>) {
        tracing::info!(session = %self.catalog.id(), "sync listener started");

        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    self.handle(envelope);
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    // the next snapshot carries the full state, nothing to replay
                    tracing::warn!(count, "sync listener lagged, {} events skipped", count);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("sync bus closed, stopping listener");
                    break;
                }
            }
        }
    }

    /// Apply one envelope, returning whether local state changed
    pub fn handle(&self, envelope: EventEnvelope) -> bool {
        if self.is_own(&envelope) {
            return false;
        }

        let result = match envelope.event {
            SyncEvent::Catalog(snapshot) => self.catalog.apply(snapshot),
            SyncEvent::Settings { revision, settings } => match &self.settings {
                Some(service) => service.apply(revision, envelope.origin, settings),
                None => Ok(false),
            },
        };

        match result {
            Ok(applied) => applied,
            Err(e) => {
                tracing::error!(event_id = %envelope.id, error = %e, "failed to apply sync event");
                false
            }
        }
    }

    fn is_own(&self, envelope: &EventEnvelope) -> bool {
        envelope.origin == self.catalog.id()
            || self
                .settings
                .as_ref()
                .is_some_and(|service| envelope.origin == service.id())
    }
}

/// Aborts a spawned listener when dropped
///
/// The stores a listener applies to usually publish on the same bus, so the
/// bus never closes while the listener runs; its owner stops it with this.
#[derive(Debug)]
pub struct ListenerGuard(JoinHandle<()>);

impl ListenerGuard {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self(handle)
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}
