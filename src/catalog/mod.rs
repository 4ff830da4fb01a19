//! Catalog snapshots and the store that swaps them atomically

pub mod store;
pub mod sync;

pub use store::{CatalogStore, Snapshot};
pub use sync::{ListenerGuard, SyncListener};

use crate::core::card::Card;
use crate::core::deck::Deck;
use crate::core::error::{CatalogError, DeckError};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// The cards and decks of a session
///
/// Cards sit behind an `Arc` and are shared between catalog versions; only the
/// deck list is copied when a deck changes. Every deck held by a catalog has
/// its derived fields refreshed against that catalog's cards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Arc<Vec<Card>>,
    index: Arc<HashMap<String, usize>>,
    decks: Vec<Deck>,
}

fn index_cards(cards: &[Card]) -> Result<HashMap<String, usize>, CatalogError> {
    let mut index = HashMap::with_capacity(cards.len());
    for (position, card) in cards.iter().enumerate() {
        if index.insert(card.code.clone(), position).is_some() {
            return Err(CatalogError::DuplicateCardCode {
                code: card.code.clone(),
            });
        }
    }
    Ok(index)
}

impl Catalog {
    /// Build a catalog, rejecting duplicate card codes and deck ids
    pub fn new(cards: Vec<Card>, decks: Vec<Deck>) -> Result<Self, CatalogError> {
        let index = index_cards(&cards)?;
        let catalog = Self {
            cards: Arc::new(cards),
            index: Arc::new(index),
            decks: Vec::new(),
        };
        catalog.with_decks(decks)
    }

    fn push_refreshed(&mut self, mut deck: Deck) {
        deck.refresh(self);
        self.decks.push(deck);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn card(&self, code: &str) -> Option<&Card> {
        self.index.get(code).and_then(|&i| self.cards.get(i))
    }

    pub fn deck(&self, id: &Uuid) -> Option<&Deck> {
        self.decks.iter().find(|deck| &deck.id == id)
    }

    /// Same decks over a new card list, every deck revalidated
    pub fn with_cards(&self, cards: Vec<Card>) -> Result<Self, CatalogError> {
        Self::new(cards, self.decks.clone())
    }

    /// Same cards with `deck` inserted or replacing the deck with its id
    pub fn with_deck(&self, mut deck: Deck) -> Self {
        deck.refresh(self);
        let mut next = self.clone();
        match next.decks.iter_mut().find(|d| d.id == deck.id) {
            Some(existing) => *existing = deck,
            None => next.decks.push(deck),
        }
        next
    }

    /// Same cards with the deck `id` removed
    pub fn without_deck(&self, id: &Uuid) -> Result<Self, DeckError> {
        if self.deck(id).is_none() {
            return Err(DeckError::NotFound { id: *id });
        }
        let mut next = self.clone();
        next.decks.retain(|deck| &deck.id != id);
        Ok(next)
    }

    /// Same cards, every deck replaced
    pub fn with_decks(&self, decks: Vec<Deck>) -> Result<Self, CatalogError> {
        let mut next = Self {
            cards: Arc::clone(&self.cards),
            index: Arc::clone(&self.index),
            decks: Vec::with_capacity(decks.len()),
        };
        for deck in decks {
            if next.deck(&deck.id).is_some() {
                return Err(CatalogError::DuplicateDeckId { id: deck.id });
            }
            next.push_refreshed(deck);
        }
        Ok(next)
    }
}
