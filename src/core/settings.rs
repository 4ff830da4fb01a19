//! Persisted user settings: locale, page size and per-view filter/sort state

use crate::core::card::Card;
use crate::core::collation::{Collator, Locale};
use crate::core::deck::Deck;
use crate::core::entity::Filterable;
use crate::core::error::ConfigError;
use crate::filter::{self, FilterConfig, FilterRegistry};
use crate::sort::{self, SortSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// View names under which list state is persisted
pub const CARDS_VIEW: &str = "cards";
pub const DECKS_VIEW: &str = "decks";

/// Filter and sort state of one view (card browser, deck list, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub sort: SortSpec,
}

/// User settings shared by every open session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub views: BTreeMap<String, ViewState>,
}

fn default_page_size() -> usize {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            page_size: default_page_size(),
            views: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Check the settings before committing them
    ///
    /// The `cards` and `decks` views must hold filters that compile against
    /// the matching registry and sort specs naming sortable fields.
    pub fn validate(
        &self,
        max_page_size: usize,
        card_filters: &FilterRegistry,
        deck_filters: &FilterRegistry,
    ) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > max_page_size {
            return Err(ConfigError::InvalidPagination {
                message: format!("page size must be between 1 and {}", max_page_size),
            });
        }

        let collator = Collator::new(self.locale.clone());
        self.validate_view::<Card>(CARDS_VIEW, card_filters, &collator)?;
        self.validate_view::<Deck>(DECKS_VIEW, deck_filters, &collator)
    }

    fn validate_view<E: Filterable>(
        &self,
        view: &str,
        registry: &FilterRegistry,
        collator: &Collator,
    ) -> Result<(), ConfigError> {
        if let Some(state) = self.views.get(view) {
            filter::compile(registry, &state.filters, collator)?;
            sort::compile::<E>(&state.sort, collator)?;
        }
        Ok(())
    }
}
