//! Field registry and resolution
//!
//! Maps logical field names to structured columns or dynamic attribute paths.
//! Built once from configuration at startup; read-only afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::constants::MAX_IDENTIFIER_LEN;

use super::error::ResolutionError;
use super::types::{FieldDescriptor, FieldKind, ValueType};

/// What to do with a field name that is not in the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Reject with `UnknownField`
    Strict,
    /// Treat as a dynamic attribute of the document column (name must be a safe identifier)
    #[default]
    Permissive,
}

impl std::fmt::Display for UnknownFieldPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownFieldPolicy::Strict => write!(f, "strict"),
            UnknownFieldPolicy::Permissive => write!(f, "permissive"),
        }
    }
}

/// Registry entry as written in configuration.
///
/// Exactly one of `column` (structured) or `attribute` (declared dynamic) is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl FieldSpec {
    pub fn column(column: &str, value_type: ValueType) -> Self {
        Self {
            column: Some(column.to_string()),
            attribute: None,
            value_type,
        }
    }

    pub fn attribute(attribute: &str, value_type: ValueType) -> Self {
        Self {
            column: None,
            attribute: Some(attribute.to_string()),
            value_type,
        }
    }
}

/// Errors building the registry from configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{what} '{value}' is not a safe SQL identifier")]
    UnsafeIdentifier { what: &'static str, value: String },

    #[error("field '{field}' must set exactly one of 'column' or 'attribute'")]
    AmbiguousField { field: String },
}

/// Letters, digits and underscore only, 1..=64 characters.
///
/// Anything assembled into SQL text (column names, dynamic attribute paths)
/// must pass this check.
pub fn is_safe_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_IDENTIFIER_LEN
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn ensure_safe(what: &'static str, value: &str) -> Result<(), RegistryError> {
    if is_safe_identifier(value) {
        Ok(())
    } else {
        Err(RegistryError::UnsafeIdentifier {
            what,
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: HashMap<String, FieldDescriptor>,
    document_column: String,
    policy: UnknownFieldPolicy,
}

impl FieldRegistry {
    pub fn new(
        specs: &BTreeMap<String, FieldSpec>,
        document_column: &str,
        policy: UnknownFieldPolicy,
    ) -> Result<Self, RegistryError> {
        ensure_safe("document column", document_column)?;

        let mut fields = HashMap::with_capacity(specs.len());
        for (name, spec) in specs {
            let kind = match (&spec.column, &spec.attribute) {
                (Some(column), None) => {
                    ensure_safe("column", column)?;
                    FieldKind::Structured {
                        column: column.clone(),
                    }
                }
                (None, Some(attribute)) => {
                    ensure_safe("attribute", attribute)?;
                    FieldKind::Dynamic {
                        path: attribute.clone(),
                    }
                }
                _ => {
                    return Err(RegistryError::AmbiguousField {
                        field: name.clone(),
                    });
                }
            };
            fields.insert(
                name.clone(),
                FieldDescriptor {
                    logical_name: name.clone(),
                    kind,
                    value_type: Some(spec.value_type),
                },
            );
        }

        tracing::debug!(
            fields = fields.len(),
            policy = %policy,
            "Field registry built"
        );

        Ok(Self {
            fields,
            document_column: document_column.to_string(),
            policy,
        })
    }

    /// Resolve a logical field name.
    ///
    /// Registry hits return the declared descriptor. Misses follow the
    /// unknown-field policy; permissive resolution still rejects names that are
    /// not safe identifiers since the attribute path becomes SQL text.
    pub fn resolve(&self, field: &str) -> Result<FieldDescriptor, ResolutionError> {
        if let Some(descriptor) = self.fields.get(field) {
            return Ok(descriptor.clone());
        }

        match self.policy {
            UnknownFieldPolicy::Strict => Err(ResolutionError::UnknownField {
                field: field.to_string(),
            }),
            UnknownFieldPolicy::Permissive => {
                if !is_safe_identifier(field) {
                    return Err(ResolutionError::UnsafeDynamicFieldName {
                        field: field.to_string(),
                    });
                }
                Ok(FieldDescriptor {
                    logical_name: field.to_string(),
                    kind: FieldKind::Dynamic {
                        path: field.to_string(),
                    },
                    value_type: None,
                })
            }
        }
    }

    pub fn document_column(&self) -> &str {
        &self.document_column
    }
}

/// Sort whitelist (logical name → column), deliberately separate from the
/// filter registry
#[derive(Debug, Clone, Default)]
pub struct SortableFields {
    columns: HashMap<String, String>,
}

impl SortableFields {
    pub fn new(entries: &BTreeMap<String, String>) -> Result<Self, RegistryError> {
        let mut columns = HashMap::with_capacity(entries.len());
        for (name, column) in entries {
            ensure_safe("sortable column", column)?;
            columns.insert(name.clone(), column.clone());
        }
        Ok(Self { columns })
    }

    pub fn resolve(&self, field: &str) -> Result<&str, ResolutionError> {
        self.columns
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| ResolutionError::UnsortableField {
                field: field.to_string(),
            })
    }
}
