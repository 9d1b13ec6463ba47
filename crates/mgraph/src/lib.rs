//! Facade crate for `ModelGraph`.
//! Re-exports the schema registry, the instance core and logging, and assembles them from
//! layered configuration.
//! Keep this crate thin: it should compose other crates, not implement model logic.
//!
//! ## Usage
//! - Describe the platform in `mgraph.toml` (sections `serializer`, `factory`, `logging`).
//! - Call [`Platform::from_config`] with the model files, then [`Platform::init_logging`].

pub mod config;
mod error;
mod platform;
mod settings;

pub use crate::error::{PlatformError, PlatformErrorExt};
pub use crate::platform::Platform;
pub use crate::settings::{FactorySettings, Settings};
pub use mgraph_core as core;
pub use mgraph_introspect as introspect;
pub use mgraph_logger as logger;

/// The types most applications need.
pub mod prelude {
    pub use crate::{FactorySettings, Platform, PlatformError, Settings};
    pub use mgraph_core::{
        AbstractResolution, Concept, FactoryOptions, GenerateMode, Identifiable, Instance,
        ModelError, Relationship, Resource, Serializer, SerializerOptions, Value, ViolationKind,
    };
    pub use mgraph_introspect::{DeclarationDefinition, ModelFile, ModelManager, PropertyDefinition};
    pub use mgraph_logger::{LogContext, LogLevel, LogSettings, Logger};
}
