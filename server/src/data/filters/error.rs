//! Filter compiler error taxonomy
//!
//! All of these are detected before any storage call and map to client errors.
//! Messages name the offending filter but never include query text.

use thiserror::Error;

use super::types::{OperatorTag, ValueType};

/// Request-shape errors raised by the validator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("filters must be an array")]
    NotAnArray,

    #[error("filter {index}: expected an object")]
    NotAnObject { index: usize },

    #[error("filter {index}: field must be a non-empty string")]
    MissingField { index: usize },

    #[error("filter {index} ({field}): unsupported operator '{op}'")]
    InvalidOperator {
        index: usize,
        field: String,
        op: String,
    },

    #[error("filter {index} ({field}): value is required")]
    MissingValue { index: usize, field: String },

    #[error("filter {index} ({field}): operator IN requires a non-empty array of scalar values")]
    InvalidArrayValue { index: usize, field: String },

    #[error("filter {index} ({field}): operator {op} requires a scalar value")]
    InvalidScalarValue {
        index: usize,
        field: String,
        op: OperatorTag,
    },

    #[error("at most {max} filters are allowed")]
    TooManyFilters { max: usize },

    #[error("filter {index} ({field}): IN accepts at most {max} values")]
    TooManyValues {
        index: usize,
        field: String,
        max: usize,
    },
}

/// Field lookup errors raised by the resolver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("field name '{field}' is not a valid attribute name")]
    UnsafeDynamicFieldName { field: String },

    #[error("cannot sort by '{field}'")]
    UnsortableField { field: String },
}

/// Per-clause errors raised by the clause compiler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("operator {op} is not supported for {value_type} field '{field}'")]
    UnsupportedOperatorForType {
        field: String,
        op: OperatorTag,
        value_type: ValueType,
    },

    #[error("value for field '{field}' must be a {expected}")]
    ValueTypeMismatch { field: String, expected: ValueType },
}

/// Any error produced while compiling a search request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl FilterError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => match e {
                ValidationError::NotAnArray => "FILTERS_NOT_AN_ARRAY",
                ValidationError::NotAnObject { .. } => "INVALID_FILTER",
                ValidationError::MissingField { .. } => "MISSING_FIELD",
                ValidationError::InvalidOperator { .. } => "INVALID_OPERATOR",
                ValidationError::MissingValue { .. } => "MISSING_VALUE",
                ValidationError::InvalidArrayValue { .. } => "INVALID_ARRAY_VALUE",
                ValidationError::InvalidScalarValue { .. } => "INVALID_SCALAR_VALUE",
                ValidationError::TooManyFilters { .. } => "TOO_MANY_FILTERS",
                ValidationError::TooManyValues { .. } => "TOO_MANY_VALUES",
            },
            Self::Resolution(e) => match e {
                ResolutionError::UnknownField { .. } => "UNKNOWN_FIELD",
                ResolutionError::UnsafeDynamicFieldName { .. } => "UNSAFE_FIELD_NAME",
                ResolutionError::UnsortableField { .. } => "INVALID_SORT_FIELD",
            },
            Self::Compile(e) => match e {
                CompileError::UnsupportedOperatorForType { .. } => {
                    "UNSUPPORTED_OPERATOR_FOR_TYPE"
                }
                CompileError::ValueTypeMismatch { .. } => "VALUE_TYPE_MISMATCH",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_operator_message_names_filter() {
        let err = ValidationError::InvalidOperator {
            index: 0,
            field: "price".to_string(),
            op: "BETWEEN".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "filter 0 (price): unsupported operator 'BETWEEN'"
        );
    }

    #[test]
    fn filter_error_is_transparent() {
        let err: FilterError = ResolutionError::UnknownField {
            field: "weight_kg".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "unknown field 'weight_kg'");
        assert_eq!(err.code(), "UNKNOWN_FIELD");
    }

    #[test]
    fn compile_error_display() {
        let err = CompileError::UnsupportedOperatorForType {
            field: "in_stock".to_string(),
            op: OperatorTag::Gt,
            value_type: ValueType::Boolean,
        };
        assert_eq!(
            err.to_string(),
            "operator GT is not supported for boolean field 'in_stock'"
        );
    }
}
