//! Clause compilation
//!
//! Turns one resolved filter into a SQL fragment with `?` placeholders and the
//! values bound to them. Values never appear in the fragment text.

use super::error::CompileError;
use super::types::{
    CompiledClause, FieldDescriptor, FieldKind, FilterValue, OperatorTag, Scalar, ValidatedFilter,
    ValueType,
};

/// SQLite JSON1 extraction of a document attribute.
///
/// `path` must already be a safe identifier (enforced by the resolver/registry).
pub fn json_extract(document_column: &str, path: &str) -> String {
    format!("json_extract({}, '$.{}')", document_column, path)
}

/// Compile a validated filter against its resolved descriptor
pub fn compile_clause(
    filter: &ValidatedFilter,
    descriptor: &FieldDescriptor,
    document_column: &str,
) -> Result<CompiledClause, CompileError> {
    let op = filter.op;

    if op.is_ordering() && descriptor.value_type == Some(ValueType::Boolean) {
        return Err(CompileError::UnsupportedOperatorForType {
            field: descriptor.logical_name.clone(),
            op,
            value_type: ValueType::Boolean,
        });
    }

    let operand = match &descriptor.kind {
        FieldKind::Structured { column } => column.clone(),
        FieldKind::Dynamic { path } => {
            let extract = json_extract(document_column, path);
            if op.is_ordering() {
                // Attributes come back as text or JSON numbers; order numerically unless declared string
                let target = match descriptor.value_type {
                    Some(ValueType::String) => "TEXT",
                    _ => "REAL",
                };
                format!("CAST({} AS {})", extract, target)
            } else {
                extract
            }
        }
    };

    let bound_values = match &filter.value {
        FilterValue::Scalar(value) => vec![bind_value(value, op, descriptor)?],
        FilterValue::List(values) => values
            .iter()
            .map(|v| bind_value(v, op, descriptor))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let sql_fragment = match op {
        OperatorTag::In => {
            let placeholders = vec!["?"; bound_values.len()].join(",");
            format!("{} IN ({})", operand, placeholders)
        }
        _ => format!("{} {} ?", operand, op.sql_symbol()),
    };

    Ok(CompiledClause {
        sql_fragment,
        bound_values,
    })
}

fn bind_value(
    value: &Scalar,
    op: OperatorTag,
    descriptor: &FieldDescriptor,
) -> Result<Scalar, CompileError> {
    if op == OperatorTag::Like {
        return Ok(Scalar::Text(format!("%{}%", value.to_text())));
    }
    match descriptor.value_type {
        Some(target) => coerce(value, target, &descriptor.logical_name),
        None if op.is_ordering() => coerce(value, ValueType::Number, &descriptor.logical_name),
        None => Ok(value.clone()),
    }
}

/// Coerce a client value to the declared field type
fn coerce(value: &Scalar, target: ValueType, field: &str) -> Result<Scalar, CompileError> {
    let mismatch = || CompileError::ValueTypeMismatch {
        field: field.to_string(),
        expected: target,
    };

    match target {
        ValueType::Number => match value {
            Scalar::Integer(_) | Scalar::Float(_) => Ok(value.clone()),
            Scalar::Text(s) => parse_number(s).ok_or_else(mismatch),
            Scalar::Bool(_) => Err(mismatch()),
        },
        ValueType::String => Ok(match value {
            Scalar::Text(s) => Scalar::Text(s.clone()),
            other => Scalar::Text(other.to_text()),
        }),
        ValueType::Boolean => match value {
            Scalar::Bool(b) => Ok(Scalar::Bool(*b)),
            Scalar::Integer(0) => Ok(Scalar::Bool(false)),
            Scalar::Integer(1) => Ok(Scalar::Bool(true)),
            Scalar::Text(s) if s.eq_ignore_ascii_case("true") => Ok(Scalar::Bool(true)),
            Scalar::Text(s) if s.eq_ignore_ascii_case("false") => Ok(Scalar::Bool(false)),
            _ => Err(mismatch()),
        },
    }
}

fn parse_number(s: &str) -> Option<Scalar> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Scalar::Integer(i));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Scalar::Float)
}
