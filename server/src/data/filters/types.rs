//! Filter type definitions
//!
//! Defines the request shape, the closed operator set, scalar values and the
//! intermediate values produced by each compiler stage.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Search request body as received from the HTTP layer.
///
/// `filters` is kept as raw JSON so the validator can report shape errors
/// (non-array, null values, unknown operators) with precise context.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[schema(value_type = Option<Vec<Object>>)]
    pub filters: Option<serde_json::Value>,
    #[validate(nested)]
    pub sort: Option<SortSpec>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Closed operator whitelist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatorTag {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    In,
}

impl OperatorTag {
    /// Parse an operator from client text. Accepts the tag names and their
    /// symbolic spellings, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQ" | "=" | "==" => Some(Self::Eq),
            "NE" | "!=" | "<>" => Some(Self::Ne),
            "GT" | ">" => Some(Self::Gt),
            "GE" | "GTE" | ">=" => Some(Self::Ge),
            "LT" | "<" => Some(Self::Lt),
            "LE" | "LTE" | "<=" => Some(Self::Le),
            "LIKE" => Some(Self::Like),
            "IN" => Some(Self::In),
            _ => None,
        }
    }

    /// SQL comparison symbol (IN and LIKE are keywords)
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
        }
    }

    /// Ordering comparisons need a comparable (cast) operand
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::Like => "LIKE",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single bound value. Also used for LIMIT/OFFSET parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// Convert a JSON value into a scalar. Arrays, objects and null are not scalars.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Integer(i)),
                None => n.as_f64().map(Self::Float),
            },
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Textual form used for LIKE patterns and string coercion
    pub fn to_text(&self) -> String {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Filter value after validation: a scalar, or a non-empty list for IN
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

/// A filter that passed shape validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFilter {
    pub field: String,
    pub op: OperatorTag,
    pub value: FilterValue,
}

/// Declared value type of a registered field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Number => write!(f, "number"),
            ValueType::String => write!(f, "string"),
            ValueType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Storage shape of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed relational column
    Structured { column: String },
    /// Attribute inside the per-row JSON document, addressed by `$.<path>`
    Dynamic { path: String },
}

/// Resolved field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub logical_name: String,
    pub kind: FieldKind,
    /// `None` for dynamic attributes inferred by permissive resolution
    pub value_type: Option<ValueType>,
}

/// SQL fragment plus its bound values, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClause {
    pub sql_fragment: String,
    pub bound_values: Vec<Scalar>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate, ToSchema)]
pub struct SortSpec {
    #[validate(length(min = 1, max = 64, message = "sort.field must be 1-64 characters"))]
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Query text with `?` placeholders and the values for them, left to right
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlPlan {
    pub sql: String,
    pub params: Vec<Scalar>,
}

impl SqlPlan {
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}
