//! Filter validation
//!
//! Checks request shape and per-filter well-formedness on the raw JSON body.

use serde_json::Value;

use crate::core::constants::{MAX_FILTERS, MAX_IN_VALUES};

use super::error::ValidationError;
use super::types::{FilterValue, OperatorTag, Scalar, ValidatedFilter};

/// Pre-built validator, constructed once at startup and shared by reference
#[derive(Debug, Clone)]
pub struct FilterValidator {
    max_filters: usize,
    max_in_values: usize,
}

impl Default for FilterValidator {
    fn default() -> Self {
        Self::new(MAX_FILTERS, MAX_IN_VALUES)
    }
}

impl FilterValidator {
    pub fn new(max_filters: usize, max_in_values: usize) -> Self {
        Self {
            max_filters,
            max_in_values,
        }
    }

    /// Validate the raw `filters` value of a request.
    ///
    /// Absent (or null) means no filters.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Vec<ValidatedFilter>, ValidationError> {
        let entries = match raw {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(ValidationError::NotAnArray),
        };

        if entries.len() > self.max_filters {
            return Err(ValidationError::TooManyFilters {
                max: self.max_filters,
            });
        }

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.validate_entry(index, entry))
            .collect()
    }

    fn validate_entry(&self, index: usize, entry: &Value) -> Result<ValidatedFilter, ValidationError> {
        let Value::Object(obj) = entry else {
            return Err(ValidationError::NotAnObject { index });
        };

        let field = match obj.get("field") {
            Some(Value::String(f)) if !f.trim().is_empty() => f.clone(),
            _ => return Err(ValidationError::MissingField { index }),
        };

        let op = match obj.get("op") {
            Some(Value::String(s)) => OperatorTag::parse(s).ok_or_else(|| {
                ValidationError::InvalidOperator {
                    index,
                    field: field.clone(),
                    op: s.clone(),
                }
            })?,
            other => {
                return Err(ValidationError::InvalidOperator {
                    index,
                    field,
                    op: other.map(|v| v.to_string()).unwrap_or_default(),
                });
            }
        };

        let value = match obj.get("value") {
            None | Some(Value::Null) => {
                return Err(ValidationError::MissingValue { index, field });
            }
            Some(v) => v,
        };

        let value = if op == OperatorTag::In {
            let Value::Array(items) = value else {
                return Err(ValidationError::InvalidArrayValue { index, field });
            };
            if items.is_empty() {
                return Err(ValidationError::InvalidArrayValue { index, field });
            }
            if items.len() > self.max_in_values {
                return Err(ValidationError::TooManyValues {
                    index,
                    field,
                    max: self.max_in_values,
                });
            }
            let scalars: Option<Vec<Scalar>> = items.iter().map(Scalar::from_json).collect();
            match scalars {
                Some(list) => FilterValue::List(list),
                None => return Err(ValidationError::InvalidArrayValue { index, field }),
            }
        } else {
            match Scalar::from_json(value) {
                Some(s) => FilterValue::Scalar(s),
                None => {
                    return Err(ValidationError::InvalidScalarValue { index, field, op });
                }
            }
        };

        Ok(ValidatedFilter { field, op, value })
    }
}
