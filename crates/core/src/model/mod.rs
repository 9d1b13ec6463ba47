//! Runtime instances of modeled types.

mod identifiable;
mod instance;
mod relationship;
mod resource;
mod typed;
mod value;

pub use identifiable::Identifiable;
pub use instance::{Instance, NodeKind, NodeRef};
pub use relationship::{RESOURCE_SCHEME, Relationship};
pub use resource::{Concept, Resource, ValidationPolicy};
pub use typed::Typed;
pub use value::{Value, format_date_time};

use crate::error::ModelError;
use chrono::{DateTime, Utc};
use mgraph_introspect::{Field, FieldTarget, PrimitiveType};

/// Reads a declared default literal as a value of the field's type.
pub(crate) fn convert_literal(field: &Field, literal: &str) -> Result<Value, ModelError> {
    let invalid = || ModelError::Internal {
        message: format!(
            "Default value {literal} of field {} is not a {}",
            field.name(),
            field.type_name()
        )
        .into(),
        context: None,
    };
    match field.target() {
        FieldTarget::Enum => Ok(Value::String(literal.to_owned())),
        FieldTarget::Class => Err(invalid()),
        FieldTarget::Primitive(primitive) => match primitive {
            PrimitiveType::String => Ok(Value::String(literal.to_owned())),
            PrimitiveType::Integer | PrimitiveType::Long => {
                literal.trim().parse().map(Value::Integer).map_err(|_| invalid())
            },
            PrimitiveType::Double => {
                literal.trim().parse().map(Value::Double).map_err(|_| invalid())
            },
            PrimitiveType::Boolean => Ok(Value::Boolean(literal == "true")),
            PrimitiveType::DateTime => DateTime::parse_from_rfc3339(literal)
                .map(|d| Value::DateTime(d.with_timezone(&Utc)))
                .map_err(|_| invalid()),
        },
    }
}

/// Stores integers written to `Double` fields as doubles, so they read back unchanged.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn widen_number(field: &Field, value: Value) -> Value {
    if field.target() != FieldTarget::Primitive(PrimitiveType::Double) {
        return value;
    }
    match value {
        Value::Integer(n) => Value::Double(n as f64),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| widen_number(field, item)).collect())
        },
        other => other,
    }
}
