//! Validation and JSON (de)serialization of instance graphs.
//!
//! Every traversal is a [`Visitor`](mgraph_introspect::Visitor) over the declarations of the
//! instance being walked, threading its state through a [`TypedStack`](crate::TypedStack)
//! owned by that traversal alone.

mod instance_generator;
mod json_generator;
mod json_populator;
mod json_writer;
mod resource_validator;
mod value_generator;

pub use instance_generator::{GenerationParams, InstanceGenerator};
pub use json_generator::{GeneratorParams, JsonGenerator};
pub use json_populator::{CLASS_KEY, JsonKind, JsonPopulator, PopulatorParams};
pub use json_writer::JsonWriter;
pub use resource_validator::{ResourceValidator, ValidatorParams};
pub use value_generator::{EmptyValueGenerator, GenerateMode, SampleValueGenerator, ValueGenerator};

use crate::error::ModelError;
use crate::factory::{Factory, FactoryOptions};
use crate::model::{Instance, NodeRef};
use mgraph_introspect::{DeclarationKind, ModelManager, model_util};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

/// Switches for [`Serializer::to_json_with`] and [`Serializer::from_json_with`].
///
/// Keys are camelCase; the snake_case aliases accept environment overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializerOptions {
    /// Validate before writing and after reading.
    pub validate: bool,
    /// Write resources found in relationship fields as their URI.
    #[serde(alias = "convert_resources_to_relationships")]
    pub convert_resources_to_relationships: bool,
    /// Inline resources found in relationship fields, once per path.
    #[serde(alias = "permit_resources_for_relationships")]
    pub permit_resources_for_relationships: bool,
    /// Write each resource in full once (with `$id`) and by URI afterwards.
    #[serde(alias = "deduplicate_resources")]
    pub deduplicate_resources: bool,
    /// Read inline objects with `$class` in relationship fields.
    #[serde(alias = "accept_resources_for_relationships")]
    pub accept_resources_for_relationships: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            validate: true,
            convert_resources_to_relationships: false,
            permit_resources_for_relationships: false,
            deduplicate_resources: false,
            accept_resources_for_relationships: false,
        }
    }
}

impl SerializerOptions {
    #[must_use]
    pub const fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }
}

/// Converts instances to and from their JSON wire form.
#[derive(Debug, Clone)]
pub struct Serializer {
    factory: Factory,
    model_manager: ModelManager,
    default_options: SerializerOptions,
}

impl Serializer {
    #[must_use]
    pub fn new(factory: Factory, model_manager: ModelManager) -> Self {
        Self { factory, model_manager, default_options: SerializerOptions::default() }
    }

    pub const fn set_default_options(&mut self, options: SerializerOptions) {
        self.default_options = options;
    }

    #[must_use]
    pub const fn default_options(&self) -> &SerializerOptions {
        &self.default_options
    }

    #[must_use]
    pub const fn factory(&self) -> &Factory {
        &self.factory
    }

    /// [`Serializer::to_json_with`] using the default options.
    ///
    /// # Errors
    /// See [`Serializer::to_json_with`].
    pub fn to_json<'a>(&self, instance: impl Into<NodeRef<'a>>) -> Result<Json, ModelError> {
        self.to_json_with(instance, &self.default_options)
    }

    /// Validates (unless disabled) and writes `instance`.
    ///
    /// # Errors
    /// [`ModelError::NotTyped`] for untyped values, [`ModelError::Validation`] for invalid
    /// graphs, [`ModelError::Generation`] when a resource sits in a relationship field without
    /// permission, and [`ModelError::GeneratedInvalidJson`] when the written text does not parse
    /// (e.g. a non-finite double).
    pub fn to_json_with<'a>(
        &self,
        instance: impl Into<NodeRef<'a>>,
        options: &SerializerOptions,
    ) -> Result<Json, ModelError> {
        let node = instance.into();
        let Some(typed) = node.typed() else {
            return Err(ModelError::NotTyped {
                message: format!(
                    "Serializer can only serialize typed instances, found {}",
                    node.type_label()
                )
                .into(),
                context: None,
            });
        };
        debug!(
            class = typed.fully_qualified_type(),
            validate = options.validate,
            "serializing instance"
        );

        if options.validate {
            let permit = options.convert_resources_to_relationships
                || options.permit_resources_for_relationships;
            ResourceValidator::permitting_resources(permit).validate(node)?;
        }

        let text = JsonGenerator::new(
            options.convert_resources_to_relationships,
            options.permit_resources_for_relationships,
            options.deduplicate_resources,
        )
        .generate(node)?;
        serde_json::from_str(&text).map_err(|source| ModelError::GeneratedInvalidJson {
            source,
            context: Some(format!("generated text: {text}").into()),
        })
    }

    /// [`Serializer::from_json_with`] using the default options.
    ///
    /// # Errors
    /// See [`Serializer::from_json_with`].
    pub fn from_json(&self, json: &Json) -> Result<Instance, ModelError> {
        self.from_json_with(json, &self.default_options)
    }

    /// Builds the instance described by `json`, dispatching on the kind of its `$class`.
    ///
    /// # Errors
    /// [`ModelError::MissingClassDiscriminator`] without a string `$class`,
    /// [`ModelError::EnumNotInstantiable`] for enum roots, population errors, and
    /// [`ModelError::Validation`] when validation is enabled and fails.
    pub fn from_json_with(
        &self,
        json: &Json,
        options: &SerializerOptions,
    ) -> Result<Instance, ModelError> {
        let Some(Json::String(fqn)) = json.get(CLASS_KEY) else {
            return Err(ModelError::MissingClassDiscriminator {
                message: format!("Does not contain a {CLASS_KEY} type identifier").into(),
                context: None,
            });
        };
        debug!(class = %fqn, validate = options.validate, "deserializing instance");

        let declaration = self.model_manager.get_type(fqn)?;
        let namespace = model_util::get_namespace(fqn);
        let type_name = model_util::get_short_name(fqn);
        let creation = FactoryOptions { allow_empty_id: true, ..FactoryOptions::default() };
        let identifier = || {
            declaration
                .identifier_field_name()
                .and_then(|field| json.get(field))
                .and_then(Json::as_str)
        };

        let factory = &self.factory;
        let instance = match declaration.kind() {
            DeclarationKind::Enum => {
                return Err(ModelError::EnumNotInstantiable {
                    message: "Attempting to create an ENUM declaration is not supported.".into(),
                    context: None,
                });
            },
            DeclarationKind::Transaction => Instance::Resource(factory.new_transaction(
                namespace,
                type_name,
                identifier(),
                &creation,
            )?),
            DeclarationKind::Event => Instance::Resource(factory.new_event(
                namespace,
                type_name,
                identifier(),
                &creation,
            )?),
            DeclarationKind::Concept => {
                Instance::Concept(factory.new_concept(namespace, type_name, &creation)?)
            },
            DeclarationKind::Asset | DeclarationKind::Participant => {
                let id = identifier().unwrap_or_default();
                Instance::Resource(factory.new_resource(namespace, type_name, id, &creation)?)
            },
        };

        let populator = JsonPopulator::new(options.accept_resources_for_relationships);
        let instance = populator.populate(factory, instance, json)?;
        if options.validate {
            ResourceValidator::permitting_resources(options.accept_resources_for_relationships)
                .validate(NodeRef::from(&instance))?;
        }
        Ok(instance)
    }
}
