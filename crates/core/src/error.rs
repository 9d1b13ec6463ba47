use crate::typed_stack::StackError;
use mgraph_introspect::IntrospectError;
use std::borrow::Cow;
use strum_macros::{AsRefStr, Display};

/// The schema rule an instance broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum ViolationKind {
    NotAResourceOrConcept,
    AbstractClassInstantiated,
    UndeclaredField,
    MissingRequiredField,
    EmptyIdentifier,
    InvalidEnumValue,
    FieldTypeViolation,
    InvalidFieldAssignment,
    NotARelationship,
    RelationshipToConceptForbidden,
    ValueConstraint,
    UnexpectedProperty,
}

/// Errors raised while creating, validating or (de)serializing instances.
#[mgraph_derive::mgraph_error]
pub enum ModelError {
    /// Type resolution against the registry failed.
    #[error("Schema error{}: {source}", format_context(.context))]
    Introspect { source: IntrospectError, context: Option<Cow<'static, str>> },

    /// An abstract type has no concrete subtype to instantiate.
    #[error("No concrete type{}: {message}", format_context(.context))]
    NoConcreteType { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An abstract type has several concrete subtypes and the factory rejects ambiguity.
    #[error("Ambiguous concrete type{}: {message}", format_context(.context))]
    AmbiguousConcreteType { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Abstract type instantiation{}: {message}", format_context(.context))]
    AbstractTypeInstantiation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid identifier{}: {message}", format_context(.context))]
    InvalidIdentifier { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The declaration kind does not fit the requested constructor.
    #[error("Not instantiable{}: {message}", format_context(.context))]
    NotInstantiable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not a transaction{}: {message}", format_context(.context))]
    NotATransaction { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not an event{}: {message}", format_context(.context))]
    NotAnEvent { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An instance graph does not conform to its schema.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation {
        kind: ViolationKind,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing class discriminator{}: {message}", format_context(.context))]
    MissingClassDiscriminator { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Enum not instantiable{}: {message}", format_context(.context))]
    EnumNotInstantiable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// JSON input that cannot be mapped onto the schema.
    #[error("Malformed input{}: {message}", format_context(.context))]
    MalformedInput { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Sample generation re-entered a required, non-array type on the current path.
    #[error("Recursive model{}: {message}", format_context(.context))]
    RecursiveModel { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The instance graph cannot be written (e.g. a resource where a relationship belongs).
    #[error("Generation error{}: {message}", format_context(.context))]
    Generation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The writer produced text that does not parse back as JSON.
    #[error("Generated invalid JSON{}: {source}", format_context(.context))]
    GeneratedInvalidJson { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid URI{}: {message}", format_context(.context))]
    InvalidUri { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The value handed to the serializer is not a typed instance.
    #[error("Not a typed instance{}: {message}", format_context(.context))]
    NotTyped { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A traversal popped or pushed out of order.
    #[error("Traversal stack error{}: {source}", format_context(.context))]
    Stack { source: StackError, context: Option<Cow<'static, str>> },

    #[error("Internal model error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ModelError {
    pub(crate) fn violation(kind: ViolationKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { kind, message: message.into(), context: None }
    }

    pub(crate) fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedInput { message: message.into(), context: None }
    }

    pub(crate) fn generation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Generation { message: message.into(), context: None }
    }

    pub(crate) fn invalid_uri(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidUri { message: message.into(), context: None }
    }

    /// The violated rule, for [`ModelError::Validation`] errors.
    #[must_use]
    pub const fn violation_kind(&self) -> Option<ViolationKind> {
        match self {
            Self::Validation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
