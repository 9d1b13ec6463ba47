//! # Introspect
//!
//! The schema registry boundary consumed by the instance layer.
//!
//! Model files arrive already parsed (see [`ModelFile`]); the [`ModelManager`] resolves
//! type references, inheritance and identifying fields into immutable
//! [`ClassDeclaration`]s. Traversals walk declarations through the [`Visitor`] trait,
//! dispatched by `match` in [`ClassDeclaration::accept`] and [`Property::accept`].
//!
//! * Every registry contains the system namespace [`SYSTEM_NAMESPACE`] with abstract
//!   `Asset`, `Participant`, `Transaction` and `Event` types.
//! * Resolution failures surface as [`IntrospectError::NamespaceNotRegistered`] and
//!   [`IntrospectError::TypeNotDeclared`]; rejected model files as
//!   [`IntrospectError::IllegalModel`].

mod declaration;
mod definition;
mod error;
mod manager;
pub mod model_util;
mod property;
mod schema;
mod system;
mod visitor;

pub use crate::declaration::{ClassDeclaration, DeclarationKind};
pub use crate::definition::{DeclarationDefinition, ModelFile, PropertyDefinition};
pub use crate::error::{IntrospectError, IntrospectErrorExt};
pub use crate::manager::ModelManager;
pub use crate::property::{
    Field, FieldTarget, FieldValidator, PrimitiveType, Property, RelationshipDeclaration,
};
pub use crate::system::{EVENT_ID_FIELD, SYSTEM_NAMESPACE, TIMESTAMP_FIELD, TRANSACTION_ID_FIELD};
pub use crate::visitor::Visitor;
