//! Entity trait consumed by the filter and sort pipeline

use crate::core::field::FieldValue;
use std::borrow::Cow;

/// An entity the pipeline can filter and sort
///
/// Implementors expose a stable unique code (used as the final sort tie-break)
/// and named attributes. A field that does not exist for a given entity returns
/// `None`, which predicates treat as non-matching and sort criteria place last.
pub trait Filterable: Send + Sync {
    /// Stable unique identifier of the entity
    fn code(&self) -> Cow<'_, str>;

    /// Value of a named field, `None` when the entity has no such field
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Field names `field_value` answers for
    fn filterable_fields() -> &'static [&'static str]
    where
        Self: Sized;

    /// Field names accepted as sort criteria
    fn sortable_fields() -> &'static [&'static str]
    where
        Self: Sized;
}

impl<T: Filterable> Filterable for &T {
    fn code(&self) -> Cow<'_, str> {
        (**self).code()
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        (**self).field_value(field)
    }

    fn filterable_fields() -> &'static [&'static str] {
        T::filterable_fields()
    }

    fn sortable_fields() -> &'static [&'static str] {
        T::sortable_fields()
    }
}
