//! Sort specification parsing
//!
//! A sort specification is written as a comma separated list of criteria,
//! each `field` or `field:direction`:
//!
//! ```text
//! cost:asc,name
//! xp:desc,faction,name:asc
//! ```

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of one sort criterion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One `(field, direction)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Ordered list of sort criteria, highest priority first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    criteria: Vec<SortCriterion>,
}

impl SortSpec {
    pub fn new(criteria: Vec<SortCriterion>) -> Self {
        Self { criteria }
    }

    /// Append a criterion with lower priority than the existing ones
    pub fn then(mut self, criterion: SortCriterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl FromStr for SortSpec {
    type Err = ConfigError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let malformed = |message: String| ConfigError::MalformedSort {
            expression: expression.to_string(),
            message,
        };

        if expression.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut criteria = Vec::new();
        for part in expression.split(',') {
            let (field, direction) = match part.split_once(':') {
                Some((field, direction)) => (field.trim(), Some(direction.trim())),
                None => (part.trim(), None),
            };
            if field.is_empty() {
                return Err(malformed("empty sort field".to_string()));
            }
            let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                Some(other) => {
                    return Err(malformed(format!("unknown direction '{}'", other)));
                }
            };
            if criteria.iter().any(|c: &SortCriterion| c.field == field) {
                return Err(malformed(format!("field '{}' listed twice", field)));
            }
            criteria.push(SortCriterion {
                field: field.to_string(),
                direction,
            });
        }

        Ok(Self { criteria })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .criteria
            .iter()
            .map(|c| format!("{}:{}", c.field, c.direction.as_str()))
            .collect();
        f.write_str(&parts.join(","))
    }
}
