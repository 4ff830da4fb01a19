//! Filter values and their parsing from JSON configuration

use crate::core::error::ConfigError;
use crate::filter::definition::FilterKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive numeric range with optional bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A parsed filter value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Set(Vec<String>),
    Range(NumericRange),
    Boolean(bool),
}

impl FilterValue {
    /// Parse a raw configuration value for a filter of the given kind
    ///
    /// Returns `Ok(None)` when the value is the identity of its kind, so the
    /// filter has no effect and is left out of the composite predicate.
    pub fn parse(key: &str, kind: FilterKind, raw: &Value) -> Result<Option<Self>, ConfigError> {
        if raw.is_null() {
            return Ok(None);
        }

        let malformed = |message: &str| ConfigError::MalformedFilter {
            key: key.to_string(),
            message: message.to_string(),
        };

        let value = match kind {
            FilterKind::Text => {
                let text = raw.as_str().ok_or_else(|| malformed("expected a string"))?;
                FilterValue::Text(text.trim().to_string())
            }
            FilterKind::Set => {
                let items = match raw {
                    Value::String(s) => vec![s.clone()],
                    Value::Array(items) => items
                        .iter()
                        .map(|item| {
                            item.as_str()
                                .map(str::to_string)
                                .ok_or_else(|| malformed("expected an array of strings"))
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    _ => return Err(malformed("expected a string or an array of strings")),
                };
                let mut selected: Vec<String> = Vec::with_capacity(items.len());
                for item in items {
                    let item = item.trim().to_string();
                    if !item.is_empty() && !selected.contains(&item) {
                        selected.push(item);
                    }
                }
                FilterValue::Set(selected)
            }
            FilterKind::Range => FilterValue::Range(parse_range(key, raw)?),
            FilterKind::Boolean => {
                FilterValue::Boolean(raw.as_bool().ok_or_else(|| malformed("expected a boolean"))?)
            }
        };

        Ok((!value.is_identity()).then_some(value))
    }

    /// Whether the value leaves every entity in the result set
    pub fn is_identity(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::Set(items) => items.is_empty(),
            FilterValue::Range(range) => range.is_unbounded(),
            FilterValue::Boolean(_) => false,
        }
    }
}

fn parse_bound(key: &str, raw: Option<&Value>) -> Result<Option<f64>, ConfigError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| ConfigError::MalformedFilter {
                key: key.to_string(),
                message: "range bounds must be numbers".to_string(),
            }),
    }
}

/// Accepts `[min, max]` or `{"min": .., "max": ..}`, either bound optional
fn parse_range(key: &str, raw: &Value) -> Result<NumericRange, ConfigError> {
    let (min, max) = match raw {
        Value::Array(bounds) if bounds.len() == 2 => (
            parse_bound(key, bounds.first())?,
            parse_bound(key, bounds.get(1))?,
        ),
        Value::Object(map) => {
            if let Some(extra) = map.keys().find(|k| *k != "min" && *k != "max") {
                return Err(ConfigError::MalformedFilter {
                    key: key.to_string(),
                    message: format!("unexpected range key '{}'", extra),
                });
            }
            (parse_bound(key, map.get("min"))?, parse_bound(key, map.get("max"))?)
        }
        _ => {
            return Err(ConfigError::MalformedFilter {
                key: key.to_string(),
                message: "expected [min, max] or {\"min\", \"max\"}".to_string(),
            });
        }
    };

    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ConfigError::InvalidRange {
                key: key.to_string(),
                min,
                max,
            });
        }
    }

    Ok(NumericRange { min, max })
}
