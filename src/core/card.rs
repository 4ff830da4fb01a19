//! Card entity as delivered by the catalog loader

use crate::core::entity::Filterable;
use crate::core::field::FieldValue;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Card faction (class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Guardian,
    Seeker,
    Rogue,
    Mystic,
    Survivor,
    Neutral,
    Mythos,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Guardian => "guardian",
            Faction::Seeker => "seeker",
            Faction::Rogue => "rogue",
            Faction::Mystic => "mystic",
            Faction::Survivor => "survivor",
            Faction::Neutral => "neutral",
            Faction::Mythos => "mythos",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Investigator,
    Asset,
    Event,
    Skill,
    Treachery,
    Enemy,
    Location,
    Story,
    Act,
    Agenda,
    Scenario,
    Key,
    #[serde(other)]
    Other,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Investigator => "investigator",
            CardType::Asset => "asset",
            CardType::Event => "event",
            CardType::Skill => "skill",
            CardType::Treachery => "treachery",
            CardType::Enemy => "enemy",
            CardType::Location => "location",
            CardType::Story => "story",
            CardType::Act => "act",
            CardType::Agenda => "agenda",
            CardType::Scenario => "scenario",
            CardType::Key => "key",
            CardType::Other => "other",
        }
    }

    /// Player cards that count toward the deck size requirement
    pub fn counts_toward_deck_size(&self) -> bool {
        matches!(self, CardType::Asset | CardType::Event | CardType::Skill)
    }
}

/// Skill icons printed on a card (or skill values of an investigator)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillIcons {
    pub willpower: u32,
    pub intellect: u32,
    pub combat: u32,
    pub agility: u32,
    pub wild: u32,
}

/// A card of the catalog
///
/// Cards are immutable for the lifetime of a catalog snapshot. Required fields
/// are enforced by deserialization; every optional attribute defaults so that a
/// sparse card database entry still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subname: Option<String>,
    pub faction: Faction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction2: Option<Faction>,
    pub type_code: CardType,
    /// `weakness` or `basicweakness` for weaknesses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype_code: Option<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<u32>,
    #[serde(default)]
    pub icons: SkillIcons,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_limit: Option<u32>,
    /// Required deck size, investigators only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub pack_code: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub permanent: bool,
}

impl Card {
    /// Create a card with the required attributes, everything else defaulted
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        faction: Faction,
        type_code: CardType,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            subname: None,
            faction,
            faction2: None,
            type_code,
            subtype_code: None,
            traits: Vec::new(),
            cost: None,
            xp: None,
            icons: SkillIcons::default(),
            health: None,
            sanity: None,
            deck_limit: None,
            deck_size: None,
            text: None,
            pack_code: "core".to_string(),
            position: 0,
            is_unique: false,
            parallel: false,
            preview: false,
            permanent: false,
        }
    }

    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_xp(mut self, xp: u32) -> Self {
        self.xp = Some(xp);
        self
    }

    pub fn with_traits(mut self, traits: &[&str]) -> Self {
        self.traits = traits.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_icons(mut self, icons: SkillIcons) -> Self {
        self.icons = icons;
        self
    }

    pub fn with_deck_limit(mut self, limit: u32) -> Self {
        self.deck_limit = Some(limit);
        self
    }

    pub fn with_deck_size(mut self, size: u32) -> Self {
        self.deck_size = Some(size);
        self
    }

    pub fn with_pack(mut self, pack_code: impl Into<String>, position: u32) -> Self {
        self.pack_code = pack_code.into();
        self.position = position;
        self
    }

    /// Both factions of a multi-class card, primary first
    pub fn factions(&self) -> Vec<Faction> {
        std::iter::once(self.faction).chain(self.faction2).collect()
    }

    pub fn is_investigator(&self) -> bool {
        self.type_code == CardType::Investigator
    }

    pub fn is_weakness(&self) -> bool {
        matches!(
            self.subtype_code.as_deref(),
            Some("weakness") | Some("basicweakness")
        )
    }

    /// Copies allowed in a deck, two unless the card says otherwise
    pub fn effective_deck_limit(&self) -> u32 {
        self.deck_limit.unwrap_or(2)
    }

    /// Whether the card counts toward the investigator's deck size
    pub fn counts_toward_deck_size(&self) -> bool {
        self.type_code.counts_toward_deck_size() && !self.permanent && !self.is_weakness()
    }
}

impl Filterable for Card {
    fn code(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.code)
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "code" => FieldValue::from(self.code.as_str()),
            "name" => FieldValue::from(self.name.as_str()),
            "subname" => FieldValue::from(self.subname.clone()),
            "faction" => FieldValue::from(self.faction.as_str()),
            "faction2" => FieldValue::from(self.faction2.map(|f| f.as_str())),
            "factions" => FieldValue::List(
                self.factions()
                    .iter()
                    .map(|f| f.as_str().to_string())
                    .collect(),
            ),
            "type" => FieldValue::from(self.type_code.as_str()),
            "subtype" => FieldValue::from(self.subtype_code.clone()),
            "traits" => FieldValue::List(self.traits.clone()),
            "cost" => FieldValue::from(self.cost),
            "xp" | "level" => FieldValue::from(self.xp),
            "willpower" => FieldValue::from(self.icons.willpower),
            "intellect" => FieldValue::from(self.icons.intellect),
            "combat" => FieldValue::from(self.icons.combat),
            "agility" => FieldValue::from(self.icons.agility),
            "wild" => FieldValue::from(self.icons.wild),
            "health" => FieldValue::from(self.health),
            "sanity" => FieldValue::from(self.sanity),
            "deck_limit" => FieldValue::from(self.effective_deck_limit()),
            "text" => FieldValue::from(self.text.clone()),
            "pack" => FieldValue::from(self.pack_code.as_str()),
            "position" => FieldValue::from(self.position),
            "unique" => FieldValue::from(self.is_unique),
            "parallel" => FieldValue::from(self.parallel),
            "preview" => FieldValue::from(self.preview),
            "permanent" => FieldValue::from(self.permanent),
            _ => return None,
        };
        Some(value)
    }

    fn filterable_fields() -> &'static [&'static str] {
        &[
            "code",
            "name",
            "subname",
            "faction",
            "faction2",
            "factions",
            "type",
            "subtype",
            "traits",
            "cost",
            "xp",
            "level",
            "willpower",
            "intellect",
            "combat",
            "agility",
            "wild",
            "health",
            "sanity",
            "deck_limit",
            "text",
            "pack",
            "position",
            "unique",
            "parallel",
            "preview",
            "permanent",
        ]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &[
            "code",
            "name",
            "faction",
            "type",
            "cost",
            "xp",
            "level",
            "willpower",
            "intellect",
            "combat",
            "agility",
            "wild",
            "health",
            "sanity",
            "pack",
            "position",
        ]
    }
}
