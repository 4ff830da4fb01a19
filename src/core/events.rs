//! Broadcast bus carrying full-state snapshots between sessions
//!
//! Every open session (browser tab, worker, server instance sharing the
//! process) publishes its committed state on a [`SyncBus`]. Subscribers treat
//! each message as an atomic replacement of their own state.
//!
//! ```text
//! CatalogStore::commit ──┐
//!                        ├──▶ SyncBus::publish() ──▶ broadcast channel ──▶ SyncListener(s)
//! SettingsService::save ─┘
//! ```

use crate::catalog::Snapshot;
use crate::core::settings::Settings;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// State carried by a sync message
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A new catalog snapshot (cards and decks)
    Catalog(Arc<Snapshot>),
    /// New settings at the given revision
    Settings { revision: u64, settings: Settings },
}

impl SyncEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::Catalog(_) => "catalog",
            SyncEvent::Settings { .. } => "settings",
        }
    }

    pub fn revision(&self) -> u64 {
        match self {
            SyncEvent::Catalog(snapshot) => snapshot.revision,
            SyncEvent::Settings { revision, .. } => *revision,
        }
    }
}

/// Envelope wrapping a sync event with metadata
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// Session that published the event
    pub origin: Uuid,
    /// When the event was published
    pub timestamp: DateTime<Utc>,
    pub event: SyncEvent,
}

impl EventEnvelope {
    pub fn new(origin: Uuid, event: SyncEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based sync bus
///
/// Cheap to clone; every clone publishes to the same channel.
#[derive(Debug, Clone)]
pub struct SyncBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl SyncBus {
    /// Create a bus buffering up to `capacity` messages per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to every subscriber, returning how many received it
    ///
    /// Publishing with no subscribers is not an error; the message is dropped.
    pub fn publish(&self, origin: Uuid, event: SyncEvent) -> usize {
        let kind = event.kind();
        let revision = event.revision();
        let receivers = self
            .sender
            .send(EventEnvelope::new(origin, event))
            .unwrap_or(0);
        tracing::debug!(kind, revision, receivers, "published sync event");
        receivers
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SyncBus {
    fn default() -> Self {
        Self::new(64)
    }
}
