//! Sort compiler: sort specification to a total-order comparator

use crate::core::collation::Collator;
use crate::core::entity::Filterable;
use crate::core::error::ConfigError;
use crate::core::field::FieldValue;
use crate::sort::spec::{SortCriterion, SortDirection, SortSpec};
use std::cmp::Ordering;

/// Comparator over entities built from a [`SortSpec`]
///
/// Criteria are applied in priority order; the first non-equal result wins.
/// When every criterion ties, entities are ordered by their code, so distinct
/// entities never compare equal and pagination is stable across runs.
///
/// Values an entity lacks (null or unknown fields) are ordered after present
/// values regardless of direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    criteria: Vec<SortCriterion>,
    collator: Collator,
}

impl Comparator {
    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    pub fn compare<E: Filterable>(&self, a: &E, b: &E) -> Ordering {
        for criterion in &self.criteria {
            let ordering = compare_field(
                a.field_value(&criterion.field),
                b.field_value(&criterion.field),
                criterion.direction,
                &self.collator,
            );
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.code().cmp(&b.code())
    }
}

/// Compile `spec` for entities of type `E`
///
/// Every criterion must name one of `E::sortable_fields()`.
pub fn compile<E: Filterable>(spec: &SortSpec, collator: &Collator) -> Result<Comparator, ConfigError> {
    let allowed = E::sortable_fields();
    if let Some(unknown) = spec
        .criteria()
        .iter()
        .find(|c| !allowed.contains(&c.field.as_str()))
    {
        return Err(ConfigError::UnknownSortField {
            field: unknown.field.clone(),
        });
    }

    Ok(Comparator {
        criteria: spec.criteria().to_vec(),
        collator: collator.clone(),
    })
}

fn present(value: Option<FieldValue>) -> Option<FieldValue> {
    value.filter(|v| !v.is_null())
}

fn compare_field(
    a: Option<FieldValue>,
    b: Option<FieldValue>,
    direction: SortDirection,
    collator: &Collator,
) -> Ordering {
    match (present(a), present(b)) {
        (Some(a), Some(b)) => {
            let ordering = compare_present(&a, &b, collator);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank of a value kind, used only when two entities disagree on a field's type
fn kind_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Integer(_) | FieldValue::Float(_) => 0,
        FieldValue::Boolean(_) => 1,
        FieldValue::String(_) => 2,
        FieldValue::List(_) => 3,
        FieldValue::Null => 4,
    }
}

fn compare_present(a: &FieldValue, b: &FieldValue, collator: &Collator) -> Ordering {
    match (a, b) {
        (FieldValue::String(x), FieldValue::String(y)) => collator.compare(x, y),
        (FieldValue::Boolean(x), FieldValue::Boolean(y)) => x.cmp(y),
        (FieldValue::List(x), FieldValue::List(y)) => collator.compare(&x.join(", "), &y.join(", ")),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}
