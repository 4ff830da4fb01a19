//! # deckbuild
//!
//! Backend and shared schemas for a card game deck builder.
//!
//! ## Features
//!
//! - **Catalog snapshots**: cards and decks held as immutable, atomically swapped snapshots
//! - **Filter pipeline**: registry-driven filters compiled into one composite predicate
//! - **Deterministic sorting**: multi-criteria comparators with locale-explicit collation
//!   and a final tie-break on the entity code
//! - **Pagination**: offset/limit slicing with total counts for pagination controls
//! - **Deck rules**: validity recomputed on every deck mutation
//! - **Sync**: full-state snapshots broadcast between sessions, last-write-wins
//! - **REST API**: axum router exposing cards, decks and settings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deckbuild::prelude::*;
//!
//! let catalog = Catalog::new(cards, Vec::new())?;
//! let registry = FilterRegistry::cards();
//! let collator = Collator::new("en".parse()?);
//!
//! let query = ViewQuery::new()
//!     .filter("faction", json!(["seeker"]))
//!     .sort("cost:asc,name".parse()?)
//!     .page(PageRequest::new(0, 20));
//!
//! let page = pipeline::run(catalog.cards(), &registry, &collator, &query)?;
//! println!("{} of {} cards", page.items.len(), page.total_count);
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod filter;
pub mod pipeline;
pub mod schema;
pub mod server;
pub mod sort;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        card::{Card, CardType, Faction, SkillIcons},
        collation::{Collator, Locale},
        deck::{Deck, DeckProblem, DeckValidation},
        entity::Filterable,
        error::{
            CatalogError, ConfigError, DeckError, DeckbuildError, DeckbuildResult, RequestError,
            StorageError,
        },
        events::{EventEnvelope, SyncBus, SyncEvent},
        field::FieldValue,
        query::{ListQuery, PaginatedResponse, PaginationMeta},
        settings::{Settings, ViewState},
    };

    // === Pipeline ===
    pub use crate::filter::{
        CompositePredicate, FilterConfig, FilterDefinition, FilterKind, FilterRegistry,
        FilterValue, MatchMode, NumericRange,
    };
    pub use crate::pipeline::{self, PageRequest, PageResult, ViewQuery};
    pub use crate::sort::{Comparator, SortCriterion, SortDirection, SortSpec};

    // === Catalog & Storage ===
    pub use crate::catalog::{Catalog, CatalogStore, ListenerGuard, Snapshot, SyncListener};
    pub use crate::storage::{InMemoryStateStore, JsonFileStore, SettingsService, StateStore};

    // === Config & Server ===
    pub use crate::config::AppConfig;
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
    pub use uuid::Uuid;
}
