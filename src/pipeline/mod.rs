//! Pipeline executor: filter, sort, paginate
//!
//! [`execute`] is a pure function over its inputs. It borrows the catalog,
//! never mutates it and keeps no state between calls, so concurrent callers
//! can share a snapshot freely and identical inputs always produce identical
//! pages.

use crate::core::collation::Collator;
use crate::core::entity::Filterable;
use crate::core::error::ConfigError;
use crate::filter::{self, CompositePredicate, FilterConfig, FilterRegistry};
use crate::sort::{self, Comparator, SortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Range;

/// Pagination request: a contiguous window of the ordered result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Every item in one page
    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: usize::MAX,
        }
    }

    /// The window `[offset, offset + limit)` clamped to `[0, total]`
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = self.offset.min(total);
        let end = self.offset.saturating_add(self.limit).min(total);
        start..end
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::all()
    }
}

/// One page of the ordered result plus the number of matching entities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

impl<T> PageResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

impl<T: Clone> PageResult<&T> {
    pub fn cloned(self) -> PageResult<T> {
        self.map(T::clone)
    }
}

/// Apply `predicate`, order survivors with `comparator`, return the `page` window
pub fn execute<'a, E: Filterable>(
    catalog: &'a [E],
    predicate: &CompositePredicate,
    comparator: &Comparator,
    page: PageRequest,
) -> PageResult<&'a E> {
    let mut matched: Vec<&E> = catalog.iter().filter(|e| predicate.test(*e)).collect();
    matched.sort_by(|a, b| comparator.compare(*a, *b));

    let total_count = matched.len();
    let window = page.window(total_count);
    let items = matched.drain(window).collect();

    PageResult { items, total_count }
}

/// Everything a view asks of the pipeline in one value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewQuery {
    pub filters: FilterConfig,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    pub fn filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

/// Compile `query` against `registry` and execute it over `catalog`
///
/// Configuration errors are returned before any work is done.
pub fn run<'a, E: Filterable>(
    catalog: &'a [E],
    registry: &FilterRegistry,
    collator: &Collator,
    query: &ViewQuery,
) -> Result<PageResult<&'a E>, ConfigError> {
    let predicate = filter::compile(registry, &query.filters, collator)?;
    let comparator = sort::compile::<E>(&query.sort, collator)?;

    let result = execute(catalog, &predicate, &comparator, query.page);

    tracing::debug!(
        catalog = catalog.len(),
        matched = result.total_count,
        returned = result.items.len(),
        sort = %query.sort,
        "pipeline executed"
    );

    Ok(result)
}
