//! Catalog store: the session's current snapshot and its commits

use crate::catalog::Catalog;
use crate::core::card::Card;
use crate::core::deck::Deck;
use crate::core::error::{DeckError, DeckbuildError, DeckbuildResult, StorageError};
use crate::core::events::{SyncBus, SyncEvent};
use crate::storage::StateStore;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A catalog at a given revision
///
/// Snapshots are immutable; a commit produces a new one with a higher revision.
/// `origin` is the session that committed it, nil for a freshly loaded catalog.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub revision: u64,
    pub origin: Uuid,
    pub catalog: Catalog,
}

impl Snapshot {
    pub fn new(revision: u64, origin: Uuid, catalog: Catalog) -> Self {
        Self {
            revision,
            origin,
            catalog,
        }
    }

    /// Whether this snapshot replaces `other` under last-write-wins
    ///
    /// Higher revisions win; two commits at the same revision are ordered by
    /// origin so every session settles on the same one.
    pub fn supersedes(&self, other: &Snapshot) -> bool {
        (self.revision, self.origin) > (other.revision, other.origin)
    }
}

/// Holds the current [`Snapshot`] and swaps it atomically on every commit
///
/// Readers take an `Arc` to the snapshot and keep using it for as long as they
/// need; a concurrent commit never changes what they see. Each commit persists
/// the deck list (when a deck store is configured) before installing the new
/// snapshot, then broadcasts it on the sync bus.
pub struct CatalogStore {
    id: Uuid,
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
    bus: Option<SyncBus>,
    deck_store: Option<Arc<dyn StateStore<Vec<Deck>>>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            id: Uuid::new_v4(),
            current: RwLock::new(Arc::new(Snapshot::new(0, Uuid::nil(), catalog))),
            writer: Mutex::new(()),
            bus: None,
            deck_store: None,
        }
    }

    pub fn with_bus(mut self, bus: SyncBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_deck_store(mut self, store: Arc<dyn StateStore<Vec<Deck>>>) -> Self {
        self.deck_store = Some(store);
        self
    }

    /// Session id used as the origin of published events
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn snapshot(&self) -> Result<Arc<Snapshot>, StorageError> {
        let current = self
            .current
            .read()
            .map_err(|_| StorageError::LockPoisoned("catalog"))?;
        Ok(Arc::clone(&current))
    }

    /// Derive the next catalog from the current one, persist it and install it
    ///
    /// Commits of this session run one at a time. If `next` or the deck save
    /// fails, the current snapshot is left untouched. A snapshot adopted from
    /// another session while the save runs is overwritten by this later write.
    async fn commit<F>(&self, next: F) -> DeckbuildResult<Arc<Snapshot>>
    where
        F: FnOnce(&Catalog) -> DeckbuildResult<Catalog>,
    {
        let _writer = self.writer.lock().await;
        let base = self.snapshot()?;
        let catalog = next(&base.catalog)?;

        if let Some(store) = &self.deck_store {
            store.save(&catalog.decks().to_vec()).await?;
        }

        let snapshot = {
            let mut current = self
                .current
                .write()
                .map_err(|_| StorageError::LockPoisoned("catalog"))?;
            let snapshot = Arc::new(Snapshot::new(current.revision + 1, self.id, catalog));
            *current = Arc::clone(&snapshot);
            snapshot
        };

        tracing::debug!(
            revision = snapshot.revision,
            cards = snapshot.catalog.cards().len(),
            decks = snapshot.catalog.decks().len(),
            "committed catalog snapshot"
        );

        if let Some(bus) = &self.bus {
            bus.publish(self.id, SyncEvent::Catalog(Arc::clone(&snapshot)));
        }
        Ok(snapshot)
    }

    /// Replace the card list, keeping and revalidating every deck
    pub async fn replace_cards(&self, cards: Vec<Card>) -> DeckbuildResult<Arc<Snapshot>> {
        self.commit(|catalog| Ok(catalog.with_cards(cards)?)).await
    }

    /// Replace the deck list, e.g. after loading it from storage
    pub async fn replace_decks(&self, decks: Vec<Deck>) -> DeckbuildResult<Arc<Snapshot>> {
        self.commit(|catalog| Ok(catalog.with_decks(decks)?)).await
    }

    /// Insert or replace a deck
    pub async fn save_deck(&self, deck: Deck) -> DeckbuildResult<Deck> {
        let id = deck.id;
        let snapshot = self.commit(|catalog| Ok(catalog.with_deck(deck))).await?;
        stored_deck(&snapshot, &id)
    }

    /// Apply a mutation to an existing deck
    ///
    /// The mutation receives the catalog the deck is checked against. An error
    /// from the mutation aborts the commit.
    pub async fn update_deck<F>(&self, id: &Uuid, mutate: F) -> DeckbuildResult<Deck>
    where
        F: FnOnce(&mut Deck, &Catalog) -> Result<(), DeckError>,
    {
        let snapshot = self
            .commit(|catalog| {
                let mut deck = catalog
                    .deck(id)
                    .cloned()
                    .ok_or(DeckError::NotFound { id: *id })?;
                mutate(&mut deck, catalog)?;
                Ok(catalog.with_deck(deck))
            })
            .await?;
        stored_deck(&snapshot, id)
    }

    pub async fn delete_deck(&self, id: &Uuid) -> DeckbuildResult<()> {
        self.commit(|catalog| Ok(catalog.without_deck(id)?)).await?;
        Ok(())
    }

    /// Adopt a snapshot received from another session if it supersedes ours
    pub fn apply(&self, snapshot: Arc<Snapshot>) -> Result<bool, StorageError> {
        let mut current = self
            .current
            .write()
            .map_err(|_| StorageError::LockPoisoned("catalog"))?;
        if !snapshot.supersedes(&current) {
            tracing::warn!(
                received = snapshot.revision,
                current = current.revision,
                "ignoring stale catalog snapshot"
            );
            return Ok(false);
        }
        tracing::debug!(revision = snapshot.revision, "adopted catalog snapshot");
        *current = snapshot;
        Ok(true)
    }
}

fn stored_deck(snapshot: &Snapshot, id: &Uuid) -> DeckbuildResult<Deck> {
    snapshot
        .catalog
        .deck(id)
        .cloned()
        .ok_or_else(|| DeckbuildError::Internal(format!("deck {} missing after commit", id)))
}
