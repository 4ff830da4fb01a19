//! Deck entity and deck-building rules

use crate::catalog::Catalog;
use crate::core::card::Faction;
use crate::core::entity::Filterable;
use crate::core::error::DeckError;
use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Deck size when the investigator card does not state one
pub const DEFAULT_DECK_SIZE: u32 = 30;

/// Largest quantity a single slot may hold
pub const MAX_SLOT_QUANTITY: u32 = 99;

/// A single deck-building rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeckProblem {
    UnknownInvestigator { code: String },
    NotAnInvestigator { code: String },
    UnknownCard { code: String },
    InvestigatorInSlots { code: String },
    OverDeckLimit { code: String, quantity: u32, limit: u32 },
    WrongDeckSize { expected: u32, actual: u32 },
    TooMuchXp { available: u32, spent: u32 },
}

/// Outcome of checking a deck against the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeckValidation {
    pub problems: Vec<DeckProblem>,
    /// Experience cost of every card in the deck
    pub xp_spent: u32,
}

impl DeckValidation {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// A deck: an investigator plus card quantities keyed by card code
///
/// Derived fields (`is_valid`, `problems`, `xp_spent`, `investigator_faction`)
/// are recomputed by [`Deck::refresh`] whenever the deck or the catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    pub investigator_code: String,
    #[serde(default)]
    pub slots: BTreeMap<String, u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Experience available to spend, `None` for a starting deck
    #[serde(default)]
    pub xp: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub xp_spent: u32,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub problems: Vec<DeckProblem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigator_faction: Option<Faction>,
}

impl Deck {
    pub fn new(name: impl Into<String>, investigator_code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            investigator_code: investigator_code.into(),
            slots: BTreeMap::new(),
            tags: Vec::new(),
            xp: None,
            created_at: now,
            updated_at: now,
            xp_spent: 0,
            is_valid: false,
            problems: Vec::new(),
            investigator_faction: None,
        }
    }

    /// Total number of cards in the deck
    pub fn card_count(&self) -> u32 {
        self.slots
            .values()
            .fold(0u32, |total, &quantity| total.saturating_add(quantity))
    }

    /// Check the deck against the catalog without modifying it
    pub fn validate(&self, catalog: &Catalog) -> DeckValidation {
        let mut problems = Vec::new();

        let deck_size = match catalog.card(&self.investigator_code) {
            None => {
                problems.push(DeckProblem::UnknownInvestigator {
                    code: self.investigator_code.clone(),
                });
                DEFAULT_DECK_SIZE
            }
            Some(card) if !card.is_investigator() => {
                problems.push(DeckProblem::NotAnInvestigator {
                    code: self.investigator_code.clone(),
                });
                DEFAULT_DECK_SIZE
            }
            Some(card) => card.deck_size.unwrap_or(DEFAULT_DECK_SIZE),
        };

        let mut counted: u32 = 0;
        let mut xp_spent: u32 = 0;
        for (code, &quantity) in &self.slots {
            let Some(card) = catalog.card(code) else {
                problems.push(DeckProblem::UnknownCard { code: code.clone() });
                continue;
            };
            if card.is_investigator() {
                problems.push(DeckProblem::InvestigatorInSlots { code: code.clone() });
                continue;
            }
            let limit = card.effective_deck_limit();
            if quantity > limit {
                problems.push(DeckProblem::OverDeckLimit {
                    code: code.clone(),
                    quantity,
                    limit,
                });
            }
            if card.counts_toward_deck_size() {
                counted = counted.saturating_add(quantity);
            }
            xp_spent = xp_spent.saturating_add(card.xp.unwrap_or(0).saturating_mul(quantity));
        }

        if counted != deck_size {
            problems.push(DeckProblem::WrongDeckSize {
                expected: deck_size,
                actual: counted,
            });
        }
        if let Some(available) = self.xp {
            if xp_spent > available {
                problems.push(DeckProblem::TooMuchXp {
                    available,
                    spent: xp_spent,
                });
            }
        }

        DeckValidation { problems, xp_spent }
    }

    /// Recompute the derived fields from the catalog
    pub fn refresh(&mut self, catalog: &Catalog) {
        let validation = self.validate(catalog);
        self.is_valid = validation.is_valid();
        self.xp_spent = validation.xp_spent;
        self.problems = validation.problems;
        self.investigator_faction = catalog
            .card(&self.investigator_code)
            .filter(|card| card.is_investigator())
            .map(|card| card.faction);
    }

    /// Set the quantity of a card, removing the slot at zero
    pub fn set_quantity(
        &mut self,
        code: &str,
        quantity: u32,
        catalog: &Catalog,
    ) -> Result<(), DeckError> {
        if quantity > MAX_SLOT_QUANTITY {
            return Err(DeckError::QuantityTooLarge {
                code: code.to_string(),
                quantity,
                max: MAX_SLOT_QUANTITY,
            });
        }
        if quantity == 0 {
            self.slots.remove(code);
        } else {
            if catalog.card(code).is_none() {
                return Err(DeckError::UnknownCard {
                    code: code.to_string(),
                });
            }
            self.slots.insert(code.to_string(), quantity);
        }
        self.touch();
        self.refresh(catalog);
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Replace the tags, dropping blanks and duplicates
    pub fn set_tags(&mut self, tags: Vec<String>) {
        let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !cleaned.contains(&tag) {
                cleaned.push(tag);
            }
        }
        self.tags = cleaned;
        self.touch();
    }

    pub fn set_xp(&mut self, xp: Option<u32>, catalog: &Catalog) {
        self.xp = xp;
        self.touch();
        self.refresh(catalog);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Filterable for Deck {
    fn code(&self) -> Cow<'_, str> {
        Cow::Owned(self.id.to_string())
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => FieldValue::String(self.id.to_string()),
            "name" => FieldValue::from(self.name.as_str()),
            "investigator" => FieldValue::from(self.investigator_code.as_str()),
            "faction" => FieldValue::from(self.investigator_faction.map(|f| f.as_str())),
            "tags" => FieldValue::List(self.tags.clone()),
            "xp" => FieldValue::from(self.xp),
            "xp_spent" => FieldValue::from(self.xp_spent),
            "size" => FieldValue::from(self.card_count()),
            "valid" => FieldValue::from(self.is_valid),
            "created_at" => FieldValue::String(self.created_at.to_rfc3339()),
            "updated_at" => FieldValue::String(self.updated_at.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }

    fn filterable_fields() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "investigator",
            "faction",
            "tags",
            "xp",
            "xp_spent",
            "size",
            "valid",
            "created_at",
            "updated_at",
        ]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &[
            "name",
            "investigator",
            "faction",
            "xp",
            "xp_spent",
            "size",
            "created_at",
            "updated_at",
        ]
    }
}
