//! Filter definitions and the registry that maps filter keys to them

use crate::core::entity::Filterable;
use crate::core::error::ConfigError;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Kind of value a filter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Free text, matched as a folded substring
    Text,
    /// Selection of string values
    Set,
    /// Inclusive numeric range
    Range,
    /// Boolean flag
    Boolean,
}

/// How a set filter matches against list-valued fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// At least one selected value is present
    #[default]
    Any,
    /// Every selected value is present
    All,
}

/// Declaration of one filter offered by a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Key used in filter configurations
    pub key: String,

    /// Entity fields the filter inspects
    pub fields: Vec<String>,

    pub kind: FilterKind,

    #[serde(default)]
    pub match_mode: MatchMode,
}

impl FilterDefinition {
    pub fn new(key: &str, fields: &[&str], kind: FilterKind) -> Self {
        Self {
            key: key.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            kind,
            match_mode: MatchMode::Any,
        }
    }

    pub fn text(key: &str, fields: &[&str]) -> Self {
        Self::new(key, fields, FilterKind::Text)
    }

    pub fn set(key: &str, fields: &[&str]) -> Self {
        Self::new(key, fields, FilterKind::Set)
    }

    pub fn range(key: &str, fields: &[&str]) -> Self {
        Self::new(key, fields, FilterKind::Range)
    }

    pub fn boolean(key: &str, field: &str) -> Self {
        Self::new(key, &[field], FilterKind::Boolean)
    }

    pub fn matching(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// Check the definition is well formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            NAME_REGEX.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("name pattern is valid"));

        let invalid = |message: String| ConfigError::InvalidDefinition {
            key: self.key.clone(),
            message,
        };

        if !regex.is_match(&self.key) {
            return Err(invalid("key must be lowercase snake_case".to_string()));
        }
        if self.fields.is_empty() {
            return Err(invalid("at least one field is required".to_string()));
        }
        if let Some(field) = self.fields.iter().find(|f| !regex.is_match(f)) {
            return Err(invalid(format!("field '{}' is not a valid name", field)));
        }
        if self.kind == FilterKind::Boolean && self.fields.len() != 1 {
            return Err(invalid("boolean filters inspect exactly one field".to_string()));
        }
        Ok(())
    }
}

/// Mapping from filter keys to their definitions
///
/// Registration order is preserved and is the order in which active filters are
/// evaluated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRegistry {
    definitions: IndexMap<String, FilterDefinition>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same key
    pub fn register(&mut self, definition: FilterDefinition) -> Result<(), ConfigError> {
        definition.validate()?;
        self.definitions.insert(definition.key.clone(), definition);
        Ok(())
    }

    /// Builder-style registration of a built-in definition
    fn with(mut self, definition: FilterDefinition) -> Self {
        self.definitions.insert(definition.key.clone(), definition);
        self
    }

    /// Register every definition in order, stopping at the first invalid one
    pub fn extend(
        &mut self,
        definitions: impl IntoIterator<Item = FilterDefinition>,
    ) -> Result<(), ConfigError> {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FilterDefinition> {
        self.definitions.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check every definition only names fields `E` exposes
    pub fn check_fields<E: Filterable>(&self) -> Result<(), ConfigError> {
        let known = E::filterable_fields();
        for definition in self.definitions.values() {
            if let Some(field) = definition.fields.iter().find(|f| !known.contains(&f.as_str())) {
                return Err(ConfigError::InvalidDefinition {
                    key: definition.key.clone(),
                    message: format!("unknown field '{}'", field),
                });
            }
        }
        Ok(())
    }

    /// Built-in filters of the card browser
    pub fn cards() -> Self {
        Self::new()
            .with(FilterDefinition::text(
                "search",
                &["name", "subname", "traits", "text"],
            ))
            .with(FilterDefinition::text("name", &["name", "subname"]))
            .with(FilterDefinition::set("faction", &["factions"]))
            .with(FilterDefinition::set("type", &["type"]))
            .with(FilterDefinition::set("subtype", &["subtype"]))
            .with(FilterDefinition::set("traits", &["traits"]))
            .with(FilterDefinition::set("pack", &["pack"]))
            .with(FilterDefinition::range("cost", &["cost"]))
            .with(FilterDefinition::range("xp", &["xp"]))
            .with(FilterDefinition::range("level", &["xp"]))
            .with(FilterDefinition::range("willpower", &["willpower"]))
            .with(FilterDefinition::range("intellect", &["intellect"]))
            .with(FilterDefinition::range("combat", &["combat"]))
            .with(FilterDefinition::range("agility", &["agility"]))
            .with(FilterDefinition::range("wild", &["wild"]))
            .with(FilterDefinition::range("health", &["health"]))
            .with(FilterDefinition::range("sanity", &["sanity"]))
            .with(FilterDefinition::boolean("unique", "unique"))
            .with(FilterDefinition::boolean("parallel", "parallel"))
            .with(FilterDefinition::boolean("preview", "preview"))
            .with(FilterDefinition::boolean("permanent", "permanent"))
    }

    /// Built-in filters of the deck list
    pub fn decks() -> Self {
        Self::new()
            .with(FilterDefinition::text("search", &["name", "tags"]))
            .with(FilterDefinition::set("tags", &["tags"]).matching(MatchMode::All))
            .with(FilterDefinition::set("investigator", &["investigator"]))
            .with(FilterDefinition::set("faction", &["faction"]))
            .with(FilterDefinition::range("xp", &["xp"]))
            .with(FilterDefinition::range("size", &["size"]))
            .with(FilterDefinition::boolean("valid", "valid"))
    }
}
