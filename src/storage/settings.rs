//! Settings service: current settings, persistence and sync

use crate::core::error::{DeckbuildResult, StorageError};
use crate::core::events::{SyncBus, SyncEvent};
use crate::core::settings::Settings;
use crate::storage::StateStore;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Versioned {
    revision: u64,
    origin: Uuid,
    settings: Settings,
}

/// Holds the session's settings and commits changes
///
/// A commit persists the new settings, then broadcasts them so other sessions
/// replace theirs. Received settings are adopted only if their revision is
/// newer than the local one, or equal and published by a higher session id.
pub struct SettingsService {
    id: Uuid,
    current: RwLock<Versioned>,
    writer: Mutex<()>,
    store: Arc<dyn StateStore<Settings>>,
    bus: Option<SyncBus>,
}

impl SettingsService {
    /// Load persisted settings, falling back to defaults
    pub async fn load(store: Arc<dyn StateStore<Settings>>) -> DeckbuildResult<Self> {
        Self::load_or(store, Settings::default()).await
    }

    /// Load persisted settings, using `defaults` if nothing was saved yet
    pub async fn load_or(
        store: Arc<dyn StateStore<Settings>>,
        defaults: Settings,
    ) -> DeckbuildResult<Self> {
        let settings = store.load().await?.unwrap_or(defaults);
        Ok(Self {
            id: Uuid::new_v4(),
            current: RwLock::new(Versioned {
                revision: 0,
                origin: Uuid::nil(),
                settings,
            }),
            writer: Mutex::new(()),
            store,
            bus: None,
        })
    }

    pub fn with_bus(mut self, bus: SyncBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Session id used as the origin of published events
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current(&self) -> Result<Settings, StorageError> {
        let current = self
            .current
            .read()
            .map_err(|_| StorageError::LockPoisoned("settings"))?;
        Ok(current.settings.clone())
    }

    pub fn revision(&self) -> Result<u64, StorageError> {
        let current = self
            .current
            .read()
            .map_err(|_| StorageError::LockPoisoned("settings"))?;
        Ok(current.revision)
    }

    /// Replace the settings, persist and broadcast them
    ///
    /// Callers validate beforehand; a failed save leaves the previous settings
    /// in place.
    pub async fn save(&self, settings: Settings) -> DeckbuildResult<u64> {
        let _writer = self.writer.lock().await;
        self.store.save(&settings).await?;

        let revision = {
            let mut current = self
                .current
                .write()
                .map_err(|_| StorageError::LockPoisoned("settings"))?;
            *current = Versioned {
                revision: current.revision + 1,
                origin: self.id,
                settings: settings.clone(),
            };
            current.revision
        };

        if let Some(bus) = &self.bus {
            bus.publish(self.id, SyncEvent::Settings { revision, settings });
        }
        Ok(revision)
    }

    /// Adopt settings published by session `origin` if they supersede ours
    pub fn apply(
        &self,
        revision: u64,
        origin: Uuid,
        settings: Settings,
    ) -> Result<bool, StorageError> {
        let mut current = self
            .current
            .write()
            .map_err(|_| StorageError::LockPoisoned("settings"))?;
        if (revision, origin) <= (current.revision, current.origin) {
            tracing::warn!(
                received = revision,
                current = current.revision,
                "ignoring stale settings"
            );
            return Ok(false);
        }
        *current = Versioned {
            revision,
            origin,
            settings,
        };
        Ok(true)
    }
}
