//! # Core
//!
//! Typed instances of modeled types and the traversals over them.
//!
//! * [`Factory`] creates [`Resource`]s, [`Concept`]s and [`Relationship`]s bound to resolved
//!   declarations, resolving abstract types and assigning declared defaults.
//! * [`ResourceValidator`] checks an instance graph against its schema; the first violation
//!   is reported as [`ModelError::Validation`] with a [`ViolationKind`].
//! * [`Serializer`] writes instances as JSON ([`JsonGenerator`]) and reads them back
//!   ([`JsonPopulator`]).
//! * [`InstanceGenerator`] fills instances with empty or sampled values.
//!
//! Traversals are plain recursive calls over one [`TypedStack`] per call, so independent
//! graphs can be processed concurrently without coordination.

mod error;
mod factory;
pub mod model;
pub mod serializer;
mod typed_stack;

pub use crate::error::{ModelError, ModelErrorExt, ViolationKind};
pub use crate::factory::{AbstractResolution, Factory, FactoryOptions};
pub use crate::model::{
    Concept, Identifiable, Instance, NodeKind, NodeRef, Relationship, Resource, Typed,
    ValidationPolicy, Value,
};
pub use crate::serializer::{
    GenerateMode, InstanceGenerator, JsonGenerator, JsonPopulator, ResourceValidator, Serializer,
    SerializerOptions,
};
pub use crate::typed_stack::{StackError, StackErrorExt, StackValue, TypedStack};
