//! Core module containing the entity model, errors and shared primitives

pub mod card;
pub mod collation;
pub mod deck;
pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod query;
pub mod settings;

pub use card::{Card, CardType, Faction, SkillIcons};
pub use collation::{Collator, Locale};
pub use deck::{Deck, DeckProblem, DeckValidation};
pub use entity::Filterable;
pub use error::{DeckbuildError, DeckbuildResult};
pub use events::{EventEnvelope, SyncBus, SyncEvent};
pub use field::FieldValue;
pub use query::{ListQuery, PaginatedResponse, PaginationMeta};
pub use settings::{Settings, ViewState};
