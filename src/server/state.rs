//! Shared state of the HTTP handlers

use crate::catalog::{CatalogStore, ListenerGuard};
use crate::config::AppConfig;
use crate::core::collation::Collator;
use crate::core::error::DeckbuildResult;
use crate::core::query::ListQuery;
use crate::filter::FilterRegistry;
use crate::pipeline::ViewQuery;
use crate::storage::SettingsService;
use std::sync::Arc;

pub use crate::core::settings::{CARDS_VIEW, DECKS_VIEW};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<CatalogStore>,
    pub settings: Arc<SettingsService>,
    pub card_filters: Arc<FilterRegistry>,
    pub deck_filters: Arc<FilterRegistry>,
    /// Stops the sync listener once the last clone of the state is dropped
    pub sync_listener: Arc<ListenerGuard>,
}

impl AppState {
    /// Resolve a list request into a collator and a pipeline query
    ///
    /// Request parameters win. A missing `filter` or `sort` falls back to the
    /// state saved for `view`, a missing locale or limit to the settings.
    pub fn resolve(&self, view: &str, query: &ListQuery) -> DeckbuildResult<(Collator, ViewQuery)> {
        let settings = self.settings.current()?;
        let saved = settings.views.get(view);
        let pagination = &self.config.pagination;

        let locale = query.locale()?.unwrap_or_else(|| settings.locale.clone());
        let page_size = settings.page_size.clamp(1, pagination.max_limit);
        let mut resolved = query.view_query(page_size, pagination.max_limit)?;

        if let Some(saved) = saved {
            if query.filter.is_none() {
                resolved.filters = saved.filters.clone();
            }
            if query.sort.is_none() {
                resolved.sort = saved.sort.clone();
            }
        }

        Ok((Collator::new(locale), resolved))
    }
}
