//! Creation of schema-bound instances.
//!
//! Instances are only ever built here, so every [`Resource`], [`Concept`] and
//! [`Relationship`] is bound to a resolved declaration from birth.

use crate::error::ModelError;
use crate::model::{
    Concept, Identifiable, Instance, Relationship, Resource, Typed, ValidationPolicy, Value,
};
use crate::serializer::{GenerateMode, InstanceGenerator};
use chrono::Utc;
use mgraph_introspect::{ClassDeclaration, ModelManager, TIMESTAMP_FIELD, model_util};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// How an abstract type with several concrete subtypes is instantiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbstractResolution {
    /// The first direct concrete subtype in declaration order.
    #[default]
    FirstMatch,
    /// Fail with [`ModelError::AmbiguousConcreteType`] when more than one qualifies.
    RejectAmbiguous,
}

/// Per-call creation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactoryOptions {
    /// Create instances whose writes are not checked ([`ValidationPolicy::None`]).
    pub disable_validation: bool,
    /// Fill unset properties with generated values.
    pub generate: Option<GenerateMode>,
    /// Also generate optional properties.
    pub include_optional_fields: bool,
    /// Accept an empty identifier (used by the populator before `$id` style inputs are known).
    pub allow_empty_id: bool,
}

impl FactoryOptions {
    #[must_use]
    pub const fn unvalidated() -> Self {
        Self {
            disable_validation: true,
            generate: None,
            include_optional_fields: false,
            allow_empty_id: false,
        }
    }

    #[must_use]
    pub const fn generating(mut self, mode: GenerateMode) -> Self {
        self.generate = Some(mode);
        self
    }

    #[must_use]
    pub const fn with_optional_fields(mut self) -> Self {
        self.include_optional_fields = true;
        self
    }

    const fn policy(&self) -> ValidationPolicy {
        if self.disable_validation { ValidationPolicy::None } else { ValidationPolicy::OnWrite }
    }
}

/// Creates instances bound to a [`ModelManager`].
#[derive(Debug, Clone)]
pub struct Factory {
    model_manager: ModelManager,
    resolution: AbstractResolution,
}

impl Factory {
    #[must_use]
    pub fn new(model_manager: ModelManager) -> Self {
        Self { model_manager, resolution: AbstractResolution::default() }
    }

    #[must_use]
    pub const fn with_resolution(mut self, resolution: AbstractResolution) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub const fn model_manager(&self) -> &ModelManager {
        &self.model_manager
    }

    #[must_use]
    pub const fn resolution(&self) -> AbstractResolution {
        self.resolution
    }

    /// Returns `declaration` itself when concrete, otherwise one of its direct concrete subtypes.
    ///
    /// # Errors
    /// [`ModelError::NoConcreteType`] without candidates; [`ModelError::AmbiguousConcreteType`]
    /// for several candidates under [`AbstractResolution::RejectAmbiguous`].
    pub fn resolve_concrete(
        &self,
        declaration: Arc<ClassDeclaration>,
    ) -> Result<Arc<ClassDeclaration>, ModelError> {
        if !declaration.is_abstract() {
            return Ok(declaration);
        }
        let fqn = declaration.fully_qualified_name();
        let mut candidates = self.model_manager.direct_concrete_subtypes(fqn);
        if candidates.len() > 1 && self.resolution == AbstractResolution::RejectAmbiguous {
            let names: Vec<&str> = candidates.iter().map(|c| c.fully_qualified_name()).collect();
            let names = names.join(", ");
            return Err(ModelError::AmbiguousConcreteType {
                message: format!("{fqn} has several concrete subtypes: {names}").into(),
                context: None,
            });
        }
        if candidates.is_empty() {
            return Err(ModelError::NoConcreteType {
                message: format!("No concrete extending type for {fqn}").into(),
                context: None,
            });
        }
        let concrete = candidates.swap_remove(0);
        debug!(
            abstract_type = fqn,
            concrete = concrete.fully_qualified_name(),
            "resolved abstract type"
        );
        Ok(concrete)
    }

    fn declaration(
        &self,
        namespace: &str,
        type_name: &str,
    ) -> Result<Arc<ClassDeclaration>, ModelError> {
        let fqn = model_util::fully_qualified_name(namespace, type_name);
        Ok(self.model_manager.get_type(&fqn)?)
    }

    fn concrete_declaration(
        &self,
        namespace: &str,
        type_name: &str,
    ) -> Result<Arc<ClassDeclaration>, ModelError> {
        self.resolve_concrete(self.declaration(namespace, type_name)?)
    }

    fn typed(&self, declaration: Arc<ClassDeclaration>) -> Typed {
        Typed::new(self.model_manager.clone(), declaration)
    }

    /// Creates an asset, participant, transaction or event.
    ///
    /// Abstract types resolve to a concrete subtype; declared defaults are assigned and,
    /// with [`FactoryOptions::generate`], the remaining properties are filled.
    ///
    /// # Errors
    /// [`ModelError::InvalidIdentifier`] for an empty id, [`ModelError::NotInstantiable`] for
    /// concepts and enums, plus resolution and generation errors.
    pub fn new_resource(
        &self,
        namespace: &str,
        type_name: &str,
        id: &str,
        options: &FactoryOptions,
    ) -> Result<Resource, ModelError> {
        let declaration = self.concrete_declaration(namespace, type_name)?;
        let resource = self.build_resource(declaration, id, options)?;
        self.finish_resource(resource, options)
    }

    /// Creates a concept.
    ///
    /// # Errors
    /// [`ModelError::AbstractTypeInstantiation`] when no concrete concept resolves,
    /// [`ModelError::NotInstantiable`] for non-concepts.
    pub fn new_concept(
        &self,
        namespace: &str,
        type_name: &str,
        options: &FactoryOptions,
    ) -> Result<Concept, ModelError> {
        let declaration = self.concrete_declaration(namespace, type_name).map_err(|e| match e {
            ModelError::NoConcreteType { message, context } => {
                ModelError::AbstractTypeInstantiation { message, context }
            },
            other => other,
        })?;
        if !declaration.is_concept() {
            let fqn = declaration.fully_qualified_name();
            return Err(ModelError::NotInstantiable {
                message: format!("Class is not a concept {fqn}").into(),
                context: None,
            });
        }
        let mut concept = Concept::new(self.typed(declaration), options.policy());
        concept.assign_defaults()?;

        if let Some(mode) = options.generate {
            let generated =
                InstanceGenerator::new(mode).populate(self, Instance::Concept(concept), options)?;
            concept = generated.into_concept()?;
        }
        debug!(concept = concept.fully_qualified_type(), "created concept");
        Ok(concept)
    }

    /// Creates a pointer to a resource. Only the type is checked; the target need not exist.
    ///
    /// # Errors
    /// Propagates [`ModelError::Introspect`] when the type does not resolve.
    pub fn new_relationship(
        &self,
        namespace: &str,
        type_name: &str,
        id: &str,
    ) -> Result<Relationship, ModelError> {
        let declaration = self.declaration(namespace, type_name)?;
        Ok(Relationship::new(self.typed(declaration), id))
    }

    /// Creates a transaction stamped with the current time; `id` defaults to a fresh UUID.
    ///
    /// # Errors
    /// [`ModelError::NotATransaction`] for other declaration kinds, plus the
    /// [`Factory::new_resource`] errors.
    pub fn new_transaction(
        &self,
        namespace: &str,
        type_name: &str,
        id: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Resource, ModelError> {
        let declaration = self.concrete_declaration(namespace, type_name)?;
        if !declaration.is_transaction() {
            let fqn = declaration.fully_qualified_name();
            return Err(ModelError::NotATransaction {
                message: format!("{fqn} is not a transaction").into(),
                context: None,
            });
        }
        self.new_stamped(declaration, id, options)
    }

    /// Creates an event stamped with the current time; `id` defaults to a fresh UUID.
    ///
    /// # Errors
    /// [`ModelError::NotAnEvent`] for other declaration kinds, plus the
    /// [`Factory::new_resource`] errors.
    pub fn new_event(
        &self,
        namespace: &str,
        type_name: &str,
        id: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Resource, ModelError> {
        let declaration = self.concrete_declaration(namespace, type_name)?;
        if !declaration.is_event() {
            return Err(ModelError::NotAnEvent {
                message: format!("{} is not an event", declaration.fully_qualified_name()).into(),
                context: None,
            });
        }
        self.new_stamped(declaration, id, options)
    }

    fn new_stamped(
        &self,
        declaration: Arc<ClassDeclaration>,
        id: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Resource, ModelError> {
        let id = id.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
        let mut resource = self.build_resource(declaration, &id, options)?;
        resource.set_unchecked(TIMESTAMP_FIELD, Value::DateTime(Utc::now()));
        self.finish_resource(resource, options)
    }

    fn build_resource(
        &self,
        declaration: Arc<ClassDeclaration>,
        id: &str,
        options: &FactoryOptions,
    ) -> Result<Resource, ModelError> {
        let fqn = declaration.fully_qualified_name();
        if id.trim().is_empty() && !options.allow_empty_id {
            return Err(ModelError::InvalidIdentifier {
                message: format!("Missing identifier for type {fqn}").into(),
                context: None,
            });
        }
        if declaration.is_enum() {
            return Err(ModelError::NotInstantiable {
                message: format!("Cannot instantiate enumeration {fqn}").into(),
                context: None,
            });
        }
        if declaration.is_concept() {
            return Err(ModelError::NotInstantiable {
                message: format!("Use new_concept to create concepts {fqn}").into(),
                context: None,
            });
        }

        let mut resource =
            Resource::new(self.typed(declaration), id.to_owned(), options.policy());
        resource.set_identifier(id);
        resource.assign_defaults()?;
        Ok(resource)
    }

    fn finish_resource(
        &self,
        mut resource: Resource,
        options: &FactoryOptions,
    ) -> Result<Resource, ModelError> {
        if let Some(mode) = options.generate {
            let generated =
                InstanceGenerator::new(mode).populate(self, Instance::Resource(resource), options)?;
            resource = generated.into_resource()?;
        }
        debug!(resource = %resource.fully_qualified_identifier(), "created resource");
        Ok(resource)
    }
}
