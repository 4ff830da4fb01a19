//! Filter registry and predicate compiler
//!
//! A [`FilterRegistry`] declares which filters a view offers: for each filter
//! key, the entity fields it inspects and the kind of value it takes. A
//! [`FilterConfig`] carries the user's current values. [`compile`] turns the two
//! into a single [`CompositePredicate`], the logical AND of every active filter.
//!
//! Filters whose value is the identity of their kind (null, blank text, empty
//! set, unbounded range) are dropped during compilation, so an untouched
//! control never excludes anything.

pub mod compiler;
pub mod definition;
pub mod value;

pub use compiler::{CompositePredicate, FilterConfig, compile};
pub use definition::{FilterDefinition, FilterKind, FilterRegistry, MatchMode};
pub use value::{FilterValue, NumericRange};
