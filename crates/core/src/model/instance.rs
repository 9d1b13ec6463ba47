use crate::error::ModelError;
use crate::model::{Concept, Identifiable, Relationship, Resource, Typed, Value};
use crate::typed_stack::StackValue;
use mgraph_introspect::ClassDeclaration;
use std::sync::Arc;

/// Coarse kind of a node visited during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Resource,
    Concept,
    Relationship,
    Primitive,
    Array,
}

/// A borrowed node of an instance graph.
///
/// Boxed instances inside [`Value`] are unwrapped so that a `Resource` reached through a
/// property and one handed in directly look the same to visitors.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Resource(&'a Resource),
    Concept(&'a Concept),
    Relationship(&'a Relationship),
    Value(&'a Value),
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Resource(r) => Self::Resource(r),
            Value::Concept(c) => Self::Concept(c),
            Value::Relationship(r) => Self::Relationship(r),
            other => Self::Value(other),
        }
    }

    /// The schema binding, for typed nodes.
    #[must_use]
    pub fn typed(&self) -> Option<&'a Typed> {
        match *self {
            Self::Resource(r) => Some(r.typed()),
            Self::Concept(c) => Some(c.typed()),
            Self::Relationship(r) => Some(Identifiable::typed(r)),
            Self::Value(_) => None,
        }
    }

    #[must_use]
    pub fn type_label(&self) -> String {
        match self {
            Self::Value(v) => v.type_label().into_owned(),
            other => other.typed().map(|t| t.fully_qualified_type().to_owned()).unwrap_or_default(),
        }
    }
}

impl StackValue for NodeRef<'_> {
    type Kind = NodeKind;

    fn kind(&self) -> NodeKind {
        match self {
            Self::Resource(_) => NodeKind::Resource,
            Self::Concept(_) => NodeKind::Concept,
            Self::Relationship(_) => NodeKind::Relationship,
            Self::Value(Value::Array(_)) => NodeKind::Array,
            Self::Value(_) => NodeKind::Primitive,
        }
    }
}

impl<'a> From<&'a Resource> for NodeRef<'a> {
    fn from(value: &'a Resource) -> Self {
        Self::Resource(value)
    }
}

impl<'a> From<&'a Concept> for NodeRef<'a> {
    fn from(value: &'a Concept) -> Self {
        Self::Concept(value)
    }
}

impl<'a> From<&'a Relationship> for NodeRef<'a> {
    fn from(value: &'a Relationship) -> Self {
        Self::Relationship(value)
    }
}

impl<'a> From<&'a Value> for NodeRef<'a> {
    fn from(value: &'a Value) -> Self {
        Self::from_value(value)
    }
}

impl<'a> From<&'a Instance> for NodeRef<'a> {
    fn from(value: &'a Instance) -> Self {
        match value {
            Instance::Resource(r) => Self::Resource(r),
            Instance::Concept(c) => Self::Concept(c),
        }
    }
}

/// An owned, typed object: what factories create and the serializer reads back.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    Resource(Resource),
    Concept(Concept),
}

impl Instance {
    #[must_use]
    pub const fn typed(&self) -> &Typed {
        match self {
            Self::Resource(r) => r.typed(),
            Self::Concept(c) => c.typed(),
        }
    }

    #[must_use]
    pub fn class_declaration(&self) -> &Arc<ClassDeclaration> {
        self.typed().class_declaration()
    }

    #[must_use]
    pub fn fully_qualified_type(&self) -> &str {
        self.typed().fully_qualified_type()
    }

    #[must_use]
    pub fn get_property_value(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Resource(r) => r.get_property_value(name),
            Self::Concept(c) => c.get_property_value(name),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Resource(r) => Value::from(r),
            Self::Concept(c) => Value::from(c),
        }
    }

    /// # Errors
    /// Returns [`ModelError::NotInstantiable`] when the instance is a concept.
    pub fn into_resource(self) -> Result<Resource, ModelError> {
        match self {
            Self::Resource(r) => Ok(r),
            Self::Concept(c) => Err(ModelError::NotInstantiable {
                message: format!("Expected a resource, found {c}").into(),
                context: None,
            }),
        }
    }

    /// # Errors
    /// Returns [`ModelError::NotInstantiable`] when the instance is a resource.
    pub fn into_concept(self) -> Result<Concept, ModelError> {
        match self {
            Self::Concept(c) => Ok(c),
            Self::Resource(r) => Err(ModelError::NotInstantiable {
                message: format!("Expected a concept, found {r}").into(),
                context: None,
            }),
        }
    }

    pub(crate) fn set_unchecked(&mut self, name: &str, value: Value) {
        match self {
            Self::Resource(r) => r.set_unchecked(name, value),
            Self::Concept(c) => c.set_unchecked(name, value),
        }
    }
}

impl StackValue for Instance {
    type Kind = NodeKind;

    fn kind(&self) -> NodeKind {
        match self {
            Self::Resource(_) => NodeKind::Resource,
            Self::Concept(_) => NodeKind::Concept,
        }
    }
}

impl From<Resource> for Instance {
    fn from(value: Resource) -> Self {
        Self::Resource(value)
    }
}

impl From<Concept> for Instance {
    fn from(value: Concept) -> Self {
        Self::Concept(value)
    }
}

impl TryFrom<Value> for Instance {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Resource(r) => Ok(Self::Resource(*r)),
            Value::Concept(c) => Ok(Self::Concept(*c)),
            other => Err(ModelError::NotTyped {
                message: format!(
                    "Value of type {} is not a resource or concept",
                    other.type_label()
                )
                .into(),
                context: None,
            }),
        }
    }
}
