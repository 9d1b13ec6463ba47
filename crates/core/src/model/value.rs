use crate::model::{Concept, Identifiable, Relationship, Resource};
use chrono::{DateTime, SecondsFormat, Utc};
use std::borrow::Cow;
use std::fmt;

/// A property value held by a [`Resource`] or [`Concept`].
///
/// `Integer` carries both `Integer` and `Long` fields; enum members are `String`s.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Resource(Box<Resource>),
    Concept(Box<Concept>),
    Relationship(Box<Relationship>),
    Array(Vec<Value>),
}

impl Value {
    /// The runtime type used in diagnostics: a primitive name or the instance's type.
    #[must_use]
    pub fn type_label(&self) -> Cow<'_, str> {
        match self {
            Self::String(_) => Cow::Borrowed("String"),
            Self::Integer(_) => Cow::Borrowed("Integer"),
            Self::Double(_) => Cow::Borrowed("Double"),
            Self::Boolean(_) => Cow::Borrowed("Boolean"),
            Self::DateTime(_) => Cow::Borrowed("DateTime"),
            Self::Resource(r) => Cow::Borrowed(r.fully_qualified_type()),
            Self::Concept(c) => Cow::Borrowed(c.fully_qualified_type()),
            Self::Relationship(r) => Cow::Borrowed(r.fully_qualified_type()),
            Self::Array(_) => Cow::Borrowed("Array"),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_concept(&self) -> Option<&Concept> {
        match self {
            Self::Concept(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Self::Relationship(r) => Some(r),
            _ => None,
        }
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
#[must_use]
pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::DateTime(d) => f.write_str(&format_date_time(d)),
            Self::Resource(r) => f.write_str(&r.fully_qualified_identifier()),
            Self::Concept(c) => write!(f, "{c}"),
            Self::Relationship(r) => f.write_str(&r.fully_qualified_identifier()),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            },
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Resource> for Value {
    fn from(value: Resource) -> Self {
        Self::Resource(Box::new(value))
    }
}

impl From<Concept> for Value {
    fn from(value: Concept) -> Self {
        Self::Concept(Box::new(value))
    }
}

impl From<Relationship> for Value {
    fn from(value: Relationship) -> Self {
        Self::Relationship(Box::new(value))
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}
