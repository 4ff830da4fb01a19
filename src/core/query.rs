//! List query parameters and paginated responses

use crate::core::collation::Locale;
use crate::core::error::ConfigError;
use crate::filter::FilterConfig;
use crate::pipeline::{PageRequest, ViewQuery};
use crate::sort::SortSpec;
use serde::{Deserialize, Serialize};

/// Query parameters for listing cards or decks
///
/// # Example
/// ```text
/// GET /cards?limit=20
/// GET /cards?offset=40&limit=20&sort=cost:asc,name
/// GET /cards?page=3&filter={"faction":["seeker"],"cost":[0,2]}
/// GET /decks?filter={"tags":["solo"]}&sort=updated_at:desc&locale=de
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Zero-based offset into the result; takes precedence over `page`
    pub offset: Option<usize>,

    /// One-based page number
    pub page: Option<usize>,

    /// Number of items per page
    pub limit: Option<usize>,

    /// Filters as a JSON object keyed by filter key
    ///
    /// # Format
    /// - Text: `{"search": "flashlight"}`
    /// - Set: `{"faction": ["seeker", "mystic"]}`
    /// - Range: `{"cost": [0, 2]}` or `{"xp": {"min": 1}}`
    /// - Boolean: `{"unique": true}`
    pub filter: Option<String>,

    /// Sort expression
    ///
    /// # Format
    /// - `field` or `field:asc` (ascending), `field:desc` (descending)
    /// - criteria separated by commas, highest priority first
    pub sort: Option<String>,

    /// Collation locale for text sorting and search
    pub locale: Option<String>,
}

impl ListQuery {
    /// Resolve the page window, clamping `limit` to `1..=max_limit`
    pub fn page_request(&self, default_limit: usize, max_limit: usize) -> PageRequest {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        let offset = match (self.offset, self.page) {
            (Some(offset), _) => offset,
            (None, Some(page)) => page.max(1).saturating_sub(1).saturating_mul(limit),
            (None, None) => 0,
        };
        PageRequest::new(offset, limit)
    }

    /// Parse the `filter` parameter
    pub fn filter_config(&self) -> Result<FilterConfig, ConfigError> {
        match self.filter.as_deref().map(str::trim) {
            None | Some("") => Ok(FilterConfig::new()),
            Some(raw) => serde_json::from_str(raw).map_err(|e| ConfigError::MalformedFilter {
                key: "filter".to_string(),
                message: format!("expected a JSON object: {}", e),
            }),
        }
    }

    /// Parse the `sort` parameter
    pub fn sort_spec(&self) -> Result<SortSpec, ConfigError> {
        self.sort.as_deref().unwrap_or_default().parse()
    }

    /// Parse the `locale` parameter, if any
    pub fn locale(&self) -> Result<Option<Locale>, ConfigError> {
        self.locale.as_deref().map(str::parse).transpose()
    }

    /// Build the pipeline query this request describes
    pub fn view_query(&self, default_limit: usize, max_limit: usize) -> Result<ViewQuery, ConfigError> {
        Ok(ViewQuery::new()
            .filters(self.filter_config()?)
            .sort(self.sort_spec()?)
            .page(self.page_request(default_limit, max_limit)))
    }
}

/// Paginated response structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The page of data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: PageRequest, total: usize) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page.offset, page.limit, total),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Offset of the first item
    pub offset: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Current page number (starts at 1)
    pub page: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(offset: usize, limit: usize, total: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };

        Self {
            offset,
            limit,
            total,
            page: offset / limit + 1,
            total_pages,
            has_next: offset.saturating_add(limit) < total,
            has_prev: offset > 0,
        }
    }
}
