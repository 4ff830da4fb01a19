//! Predicate compiler: active filters to one composite predicate

use crate::core::collation::Collator;
use crate::core::entity::Filterable;
use crate::core::error::ConfigError;
use crate::core::field::FieldValue;
use crate::filter::definition::{FilterRegistry, MatchMode};
use crate::filter::value::FilterValue;
use indexmap::IndexMap;
use serde_json::Value;

/// Current filter values keyed by filter key, as sent by a client or persisted
pub type FilterConfig = IndexMap<String, Value>;

/// One filter that survived compilation
#[derive(Debug, Clone, PartialEq)]
struct ActiveFilter {
    key: String,
    fields: Vec<String>,
    value: FilterValue,
    match_mode: MatchMode,
}

impl ActiveFilter {
    fn values<E: Filterable>(&self, entity: &E) -> Vec<FieldValue> {
        self.fields
            .iter()
            .filter_map(|field| entity.field_value(field))
            .filter(|value| !value.is_null())
            .collect()
    }

    fn test<E: Filterable>(&self, entity: &E, collator: &Collator) -> bool {
        let values = self.values(entity);

        match &self.value {
            FilterValue::Text(query) => {
                let needle = collator.fold(query);
                values
                    .iter()
                    .flat_map(FieldValue::strings)
                    .any(|text| collator.fold(text).contains(&needle))
            }
            FilterValue::Set(selected) => {
                let present: Vec<String> = values
                    .iter()
                    .flat_map(FieldValue::strings)
                    .map(|s| collator.fold(s))
                    .collect();
                let mut wanted = selected.iter().map(|s| collator.fold(s));
                match self.match_mode {
                    MatchMode::Any => wanted.any(|w| present.contains(&w)),
                    MatchMode::All => !present.is_empty() && wanted.all(|w| present.contains(&w)),
                }
            }
            FilterValue::Range(range) => values
                .iter()
                .filter_map(FieldValue::as_number)
                .any(|n| range.contains(n)),
            FilterValue::Boolean(expected) => values
                .iter()
                .filter_map(FieldValue::as_bool)
                .any(|b| b == *expected),
        }
    }
}

/// Logical AND of every active filter of a view
///
/// An empty predicate accepts every entity.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositePredicate {
    filters: Vec<ActiveFilter>,
    collator: Collator,
}

impl CompositePredicate {
    /// Predicate that accepts everything
    pub fn accept_all(collator: Collator) -> Self {
        Self {
            filters: Vec::new(),
            collator,
        }
    }

    /// Evaluate the predicate, stopping at the first failing filter
    pub fn test<E: Filterable>(&self, entity: &E) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.test(entity, &self.collator))
    }

    /// Keys of the filters that take part in the predicate
    pub fn active_keys(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|f| f.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Compile the active filters of `config` against `registry`
///
/// Fails on the first unknown key or malformed value; nothing is partially
/// compiled, so the caller's previous predicate stays usable.
pub fn compile(
    registry: &FilterRegistry,
    config: &FilterConfig,
    collator: &Collator,
) -> Result<CompositePredicate, ConfigError> {
    let mut filters = Vec::new();

    // Evaluate in registry order so equal configurations compile identically
    for definition in registry.definitions() {
        let Some(raw) = config.get(&definition.key) else {
            continue;
        };
        if let Some(value) = FilterValue::parse(&definition.key, definition.kind, raw)? {
            filters.push(ActiveFilter {
                key: definition.key.clone(),
                fields: definition.fields.clone(),
                value,
                match_mode: definition.match_mode,
            });
        }
    }

    if let Some(unknown) = config.keys().find(|key| registry.get(key).is_none()) {
        return Err(ConfigError::UnknownFilter {
            key: unknown.clone(),
        });
    }

    tracing::debug!(
        active = filters.len(),
        configured = config.len(),
        "compiled filter predicate"
    );

    Ok(CompositePredicate {
        filters,
        collator: collator.clone(),
    })
}
