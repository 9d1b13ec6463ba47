use crate::declaration::ClassDeclaration;
use crate::visitor::Visitor;
use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumString};

/// Primitive kinds a field may declare.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum PrimitiveType {
    String,
    Double,
    Integer,
    Long,
    Boolean,
    DateTime,
}

impl PrimitiveType {
    /// Whether `literal` can be read as a value of this kind (used for declared defaults).
    #[must_use]
    pub fn accepts_literal(self, literal: &str) -> bool {
        match self {
            Self::String => true,
            Self::Double => literal.trim().parse::<f64>().is_ok(),
            Self::Integer | Self::Long => literal.trim().parse::<i64>().is_ok(),
            Self::Boolean => matches!(literal, "true" | "false"),
            Self::DateTime => DateTime::parse_from_rfc3339(literal).is_ok(),
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Double | Self::Integer | Self::Long)
    }
}

/// Value constraint attached to a primitive field.
#[derive(Debug, Clone)]
pub enum FieldValidator {
    /// `String` values must match the expression.
    Pattern(Regex),
    /// Numeric values must lie within the inclusive bounds; `None` leaves that end open.
    Range { lower: Option<f64>, upper: Option<f64> },
}

impl FieldValidator {
    #[must_use]
    pub fn accepts_str(&self, value: &str) -> bool {
        match self {
            Self::Pattern(regex) => regex.is_match(value),
            Self::Range { .. } => true,
        }
    }

    #[must_use]
    pub fn accepts_number(&self, value: f64) -> bool {
        match self {
            Self::Pattern(_) => true,
            Self::Range { lower, upper } => {
                lower.is_none_or(|lo| value >= lo) && upper.is_none_or(|hi| value <= hi)
            },
        }
    }
}

impl fmt::Display for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(regex) => write!(f, "matching /{}/", regex.as_str()),
            Self::Range { lower, upper } => {
                let bound = |b: &Option<f64>| b.map_or_else(|| "*".to_owned(), |v| v.to_string());
                write!(f, "within [{}, {}]", bound(lower), bound(upper))
            },
        }
    }
}

/// What a field's declared type resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    Primitive(PrimitiveType),
    Enum,
    Class,
}

/// A non-relationship property of a class declaration.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) fqtn: String,
    pub(crate) array: bool,
    pub(crate) optional: bool,
    pub(crate) default_value: Option<String>,
    pub(crate) validator: Option<FieldValidator>,
    pub(crate) target: FieldTarget,
    pub(crate) parent: String,
}

impl Field {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type as written in the model (short or qualified).
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The resolved type: a primitive name or a fully qualified declaration name.
    #[must_use]
    pub fn fully_qualified_type_name(&self) -> &str {
        &self.fqtn
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self.target, FieldTarget::Primitive(_))
    }

    #[must_use]
    pub const fn is_type_enum(&self) -> bool {
        matches!(self.target, FieldTarget::Enum)
    }

    #[must_use]
    pub const fn primitive_type(&self) -> Option<PrimitiveType> {
        match self.target {
            FieldTarget::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub const fn target(&self) -> FieldTarget {
        self.target
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    #[must_use]
    pub const fn validator(&self) -> Option<&FieldValidator> {
        self.validator.as_ref()
    }

    /// Fully qualified name of the declaration that owns this field.
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }
}

/// A property holding a typed pointer to another resource.
#[derive(Debug, Clone)]
pub struct RelationshipDeclaration {
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) fqtn: String,
    pub(crate) array: bool,
    pub(crate) optional: bool,
    pub(crate) parent: String,
}

impl RelationshipDeclaration {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn fully_qualified_type_name(&self) -> &str {
        &self.fqtn
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }
}

/// Any property of a class declaration.
#[derive(Debug, Clone)]
pub enum Property {
    Field(Field),
    Relationship(RelationshipDeclaration),
}

impl Property {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(f) => f.name(),
            Self::Relationship(r) => r.name(),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Field(f) => f.type_name(),
            Self::Relationship(r) => r.type_name(),
        }
    }

    #[must_use]
    pub fn fully_qualified_type_name(&self) -> &str {
        match self {
            Self::Field(f) => f.fully_qualified_type_name(),
            Self::Relationship(r) => r.fully_qualified_type_name(),
        }
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        match self {
            Self::Field(f) => f.is_array(),
            Self::Relationship(r) => r.is_array(),
        }
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        match self {
            Self::Field(f) => f.is_optional(),
            Self::Relationship(r) => r.is_optional(),
        }
    }

    /// Relationships always point at class declarations.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        match self {
            Self::Field(f) => f.is_primitive(),
            Self::Relationship(_) => false,
        }
    }

    #[must_use]
    pub const fn is_relationship(&self) -> bool {
        matches!(self, Self::Relationship(_))
    }

    #[must_use]
    pub const fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(f) => Some(f),
            Self::Relationship(_) => None,
        }
    }

    /// Dispatches to the visitor method matching this property's variant.
    ///
    /// # Errors
    /// Propagates whatever the visitor returns.
    pub fn accept<P, V>(&self, visitor: &V, params: &mut P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        match self {
            Self::Field(field) => visitor.visit_field(field, params),
            Self::Relationship(rel) => visitor.visit_relationship_declaration(rel, params),
        }
    }
}

/// Looks up a property by name on a declaration, including inherited ones.
pub(crate) fn find<'a>(decl: &'a ClassDeclaration, name: &str) -> Option<&'a Property> {
    decl.properties().iter().find(|p| p.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_primitive_names() {
        assert_eq!(PrimitiveType::from_str("Integer").ok(), Some(PrimitiveType::Integer));
        assert!(PrimitiveType::from_str("Float").is_err());
        assert_eq!(PrimitiveType::DateTime.to_string(), "DateTime");
    }

    #[test]
    fn checks_default_literals() {
        assert!(PrimitiveType::Integer.accepts_literal(" 42 "));
        assert!(!PrimitiveType::Integer.accepts_literal("4.2"));
        assert!(PrimitiveType::Double.accepts_literal("4.2"));
        assert!(PrimitiveType::Boolean.accepts_literal("false"));
        assert!(!PrimitiveType::Boolean.accepts_literal("yes"));
        assert!(PrimitiveType::DateTime.accepts_literal("2024-01-02T03:04:05.000Z"));
        assert!(!PrimitiveType::DateTime.accepts_literal("yesterday"));
    }

    #[test]
    fn range_validator_is_inclusive_and_open_ended() {
        let v = FieldValidator::Range { lower: Some(0.0), upper: None };
        assert!(v.accepts_number(0.0));
        assert!(v.accepts_number(1e9));
        assert!(!v.accepts_number(-0.5));
        assert_eq!(v.to_string(), "within [0, *]");
    }

    #[test]
    fn pattern_validator_matches_strings_only() -> Result<(), regex::Error> {
        let v = FieldValidator::Pattern(Regex::new("^[A-Z]{3}$")?);
        assert!(v.accepts_str("ABC"));
        assert!(!v.accepts_str("abc"));
        assert!(v.accepts_number(12.0));
        Ok(())
    }
}
