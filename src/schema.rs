//! Request and response bodies of the HTTP API
//!
//! These types are the wire contract shared with clients; list parameters and
//! paginated responses live in [`crate::core::query`] and are re-exported here.

use crate::catalog::{Catalog, Snapshot};
use crate::core::card::Card;
use crate::core::deck::{Deck, MAX_SLOT_QUANTITY};
use crate::core::error::{DeckError, RequestError};
use crate::core::settings::Settings;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

pub use crate::core::query::{ListQuery, PaginatedResponse, PaginationMeta};

/// Body of `POST /decks`
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct DeckImport {
    #[validate(length(min = 1, max = 120, message = "name must be 1 to 120 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "investigator_code is required"))]
    pub investigator_code: String,

    #[serde(default)]
    pub slots: BTreeMap<String, u32>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub xp: Option<u32>,
}

impl DeckImport {
    /// Build a new deck, rejecting slots that name unknown cards
    pub fn into_deck(self, catalog: &Catalog) -> Result<Deck, DeckError> {
        let mut deck = Deck::new(self.name.trim(), self.investigator_code);
        deck.set_tags(self.tags);
        deck.xp = self.xp;
        for (code, quantity) in self.slots {
            deck.set_quantity(&code, quantity, catalog)?;
        }
        deck.refresh(catalog);
        Ok(deck)
    }
}

/// Body of `PATCH /decks/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct DeckPatch {
    #[serde(default)]
    #[validate(length(min = 1, max = 120, message = "name must be 1 to 120 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// `null` clears the experience budget
    #[serde(default, deserialize_with = "present")]
    pub xp: Option<Option<u32>>,
}

/// Distinguishes an explicit `null` from an absent field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl DeckPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.tags.is_none() && self.xp.is_none()
    }

    pub fn apply(self, deck: &mut Deck, catalog: &Catalog) {
        if let Some(name) = self.name {
            deck.rename(name.trim());
        }
        if let Some(tags) = self.tags {
            deck.set_tags(tags);
        }
        if let Some(xp) = self.xp {
            deck.set_xp(xp, catalog);
        }
    }
}

/// Body of `PUT /decks/{id}/slots/{code}`
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate)]
pub struct QuantityUpdate {
    #[validate(range(max = MAX_SLOT_QUANTITY, message = "quantity must be at most 99"))]
    pub quantity: u32,
}

/// Body of `PUT /catalog`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogUpload {
    pub cards: Vec<Card>,
}

/// Revision and sizes of a committed catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogSummary {
    pub revision: u64,
    pub cards: usize,
    pub decks: usize,
}

impl From<&Snapshot> for CatalogSummary {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            revision: snapshot.revision,
            cards: snapshot.catalog.cards().len(),
            decks: snapshot.catalog.decks().len(),
        }
    }
}

/// Settings together with the revision they were committed at
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SettingsResponse {
    pub revision: u64,
    pub settings: Settings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub revision: u64,
}

/// Run `validator` rules, mapping failures to a request error
pub fn validated<T: Validate>(body: T) -> Result<T, RequestError> {
    body.validate()?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::{CardType, Faction};
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Card::new("01001", "Roland Banks", Faction::Guardian, CardType::Investigator),
                Card::new("01020", "Dodge", Faction::Guardian, CardType::Event),
            ],
            Vec::new(),
        )
        .expect("valid catalog")
    }

    #[test]
    fn test_import_builds_refreshed_deck() {
        let import: DeckImport = serde_json::from_value(json!({
            "name": "  Roland  ",
            "investigator_code": "01001",
            "slots": {"01020": 2},
            "tags": ["Solo", "solo", " "]
        }))
        .expect("valid body");

        let deck = import.into_deck(&catalog()).expect("deck");
        assert_eq!(deck.name, "Roland");
        assert_eq!(deck.slots.get("01020"), Some(&2));
        assert_eq!(deck.tags, vec!["solo".to_string()]);
        assert_eq!(deck.investigator_faction, Some(Faction::Guardian));
    }

    #[test]
    fn test_import_rejects_unknown_slot() {
        let import = DeckImport {
            name: "Roland".to_string(),
            investigator_code: "01001".to_string(),
            slots: BTreeMap::from([("99999".to_string(), 1)]),
            ..Default::default()
        };
        assert_eq!(
            import.into_deck(&catalog()).expect_err("unknown card"),
            DeckError::UnknownCard {
                code: "99999".to_string()
            }
        );
    }

    #[test]
    fn test_import_validation() {
        let import = DeckImport::default();
        match validated(import).expect_err("empty body") {
            RequestError::ValidationFailed { fields } => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["investigator_code", "name"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let absent: DeckPatch = serde_json::from_value(json!({"name": "x"})).expect("patch");
        assert_eq!(absent.xp, None);

        let cleared: DeckPatch = serde_json::from_value(json!({"xp": null})).expect("patch");
        assert_eq!(cleared.xp, Some(None));

        let set: DeckPatch = serde_json::from_value(json!({"xp": 5})).expect("patch");
        assert_eq!(set.xp, Some(Some(5)));
        assert!(!set.is_empty());
    }

    #[test]
    fn test_patch_apply() {
        let catalog = catalog();
        let mut deck = Deck::new("Old", "01001");
        let patch: DeckPatch =
            serde_json::from_value(json!({"name": "New", "tags": ["Campaign"], "xp": 3}))
                .expect("patch");

        patch.apply(&mut deck, &catalog);
        assert_eq!(deck.name, "New");
        assert_eq!(deck.tags, vec!["campaign".to_string()]);
        assert_eq!(deck.xp, Some(3));
    }
}
