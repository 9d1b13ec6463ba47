use crate::error::{ModelError, ViolationKind};
use crate::model::{Identifiable, NodeRef, Typed, Value};
use crate::serializer::ResourceValidator;
use mgraph_introspect::{ClassDeclaration, ModelManager, Property};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// When property writes are checked against the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationPolicy {
    /// Writes land unchecked; call `validate()` explicitly.
    None,
    /// Every write is checked before it lands.
    #[default]
    OnWrite,
}

/// State shared by resources and concepts.
#[derive(Clone)]
struct Body {
    typed: Typed,
    properties: BTreeMap<String, Value>,
    policy: ValidationPolicy,
}

impl Body {
    pub(crate) const fn new(typed: Typed, policy: ValidationPolicy) -> Self {
        Self { typed, properties: BTreeMap::new(), policy }
    }

    fn check_write(&self, owner: &str, name: &str, value: &Value) -> Result<(), ModelError> {
        if self.policy == ValidationPolicy::None {
            return Ok(());
        }
        let declaration = self.typed.class_declaration();
        let property = declaration.property(name).ok_or_else(|| {
            ModelError::violation(
                ViolationKind::UndeclaredField,
                format!("Trying to set field {name} which is not declared in the model"),
            )
        })?;
        ResourceValidator::default().validate_property(
            self.typed.model_manager(),
            owner,
            property,
            NodeRef::from_value(value),
        )
    }

    fn widen(&self, name: &str, value: Value) -> Value {
        match self.typed.class_declaration().property(name).and_then(Property::as_field) {
            Some(field) => crate::model::widen_number(field, value),
            None => value,
        }
    }

    fn set(&mut self, owner: &str, name: &str, value: Value) -> Result<(), ModelError> {
        let value = self.widen(name, value);
        self.check_write(owner, name, &value)?;
        self.properties.insert(name.to_owned(), value);
        Ok(())
    }

    fn add(&mut self, owner: &str, name: &str, value: Value) -> Result<(), ModelError> {
        let Some(property) = self.typed.class_declaration().property(name) else {
            return Err(ModelError::violation(
                ViolationKind::UndeclaredField,
                format!(
                    "Trying to add array item to field {name} which is not declared in the model"
                ),
            ));
        };
        if !property.is_array() {
            return Err(ModelError::violation(
                ViolationKind::FieldTypeViolation,
                format!(
                    "Trying to add array item to field {name} which is not declared as an array"
                ),
            ));
        }
        let value = self.widen(name, Value::Array(vec![value]));
        self.check_write(owner, name, &value)?;
        let Value::Array(mut items) = value else {
            return Err("array item vanished while adding".into());
        };
        match self.properties.get_mut(name) {
            Some(Value::Array(existing)) => existing.append(&mut items),
            Some(other) => {
                return Err(ModelError::violation(
                    ViolationKind::FieldTypeViolation,
                    format!("Cannot add array item to field {name} of {owner} holding {other}"),
                ));
            },
            None => {
                self.properties.insert(name.to_owned(), Value::Array(items));
            },
        }
        Ok(())
    }

    pub(crate) fn set_unchecked(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_owned(), value);
    }

    /// Converts declared field defaults into values, leaving set properties alone.
    pub(crate) fn assign_defaults(&mut self) -> Result<(), ModelError> {
        let declaration = Arc::clone(self.typed.class_declaration());
        for property in declaration.properties() {
            let Some(field) = property.as_field() else { continue };
            let Some(literal) = field.default_value() else { continue };
            if self.properties.contains_key(field.name()) {
                continue;
            }
            let value = crate::model::convert_literal(field, literal)?;
            self.properties.insert(field.name().to_owned(), value);
        }
        Ok(())
    }
}

macro_rules! instance_accessors {
    () => {
        #[must_use]
        pub const fn typed(&self) -> &Typed {
            &self.body.typed
        }

        #[must_use]
        pub const fn model_manager(&self) -> &ModelManager {
            self.body.typed.model_manager()
        }

        #[must_use]
        pub fn class_declaration(&self) -> &Arc<ClassDeclaration> {
            self.body.typed.class_declaration()
        }

        #[must_use]
        pub fn namespace(&self) -> &str {
            self.body.typed.namespace()
        }

        #[must_use]
        pub fn type_name(&self) -> &str {
            self.body.typed.type_name()
        }

        #[must_use]
        pub fn instance_of(&self, fqn: &str) -> bool {
            self.body.typed.instance_of(fqn)
        }

        #[must_use]
        pub const fn validation_policy(&self) -> ValidationPolicy {
            self.body.policy
        }

        #[must_use]
        pub fn get_property_value(&self, name: &str) -> Option<&Value> {
            self.body.properties.get(name)
        }

        /// Every set property, keyed by name.
        #[must_use]
        pub const fn properties(&self) -> &BTreeMap<String, Value> {
            &self.body.properties
        }

        /// Removes a property, returning its value.
        pub fn remove_property_value(&mut self, name: &str) -> Option<Value> {
            self.body.properties.remove(name)
        }
    };
}

/// An identifiable domain object: asset, participant, transaction or event.
#[derive(Clone)]
pub struct Resource {
    body: Body,
    identifier: String,
}

impl Resource {
    pub(crate) const fn new(typed: Typed, identifier: String, policy: ValidationPolicy) -> Self {
        Self { body: Body::new(typed, policy), identifier }
    }

    instance_accessors!();

    /// Writes a property, checking it first under [`ValidationPolicy::OnWrite`].
    ///
    /// Writing a string to the identifying field also changes the identifier.
    ///
    /// # Errors
    /// Returns [`ModelError::Validation`] when the write breaks the schema.
    pub fn set_property_value(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        let value = value.into();
        let owner = self.fully_qualified_identifier();
        self.body.set(&owner, name, value)?;
        self.sync_identifier(name);
        Ok(())
    }

    /// Appends to an array-declared field.
    ///
    /// # Errors
    /// Returns [`ModelError::Validation`] for undeclared or non-array fields, or a value
    /// that breaks the schema under [`ValidationPolicy::OnWrite`].
    pub fn add_array_value(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        let owner = self.fully_qualified_identifier();
        self.body.add(&owner, name, value.into())
    }

    /// Changes the identifier and the identifying field together.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
        if let Some(field) = self.class_declaration().identifier_field_name().map(str::to_owned) {
            self.body.set_unchecked(&field, Value::String(self.identifier.clone()));
        }
    }

    /// Validates the whole instance graph below this resource.
    ///
    /// # Errors
    /// Returns the first [`ModelError::Validation`] encountered.
    pub fn validate(&self) -> Result<(), ModelError> {
        ResourceValidator::default().validate(NodeRef::Resource(self))
    }

    pub(crate) fn set_unchecked(&mut self, name: &str, value: Value) {
        self.body.set_unchecked(name, value);
        self.sync_identifier(name);
    }

    pub(crate) fn assign_defaults(&mut self) -> Result<(), ModelError> {
        self.body.assign_defaults()
    }

    fn sync_identifier(&mut self, name: &str) {
        if self.class_declaration().identifier_field_name() != Some(name) {
            return;
        }
        if let Some(Value::String(id)) = self.body.properties.get(name) {
            self.identifier.clone_from(id);
        }
    }
}

impl Identifiable for Resource {
    fn typed(&self) -> &Typed {
        &self.body.typed
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.fully_qualified_type() == other.fully_qualified_type()
            && self.identifier == other.identifier
            && self.body.properties == other.body.properties
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("type", &self.fully_qualified_type())
            .field("identifier", &self.identifier)
            .field("properties", &self.body.properties)
            .field("policy", &self.body.policy)
            .finish()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource {{id={}}}", self.fully_qualified_identifier())
    }
}

/// A structured value without identity, embedded inside resources.
#[derive(Clone)]
pub struct Concept {
    body: Body,
}

impl Concept {
    pub(crate) const fn new(typed: Typed, policy: ValidationPolicy) -> Self {
        Self { body: Body::new(typed, policy) }
    }

    instance_accessors!();

    #[must_use]
    pub fn fully_qualified_type(&self) -> &str {
        self.body.typed.fully_qualified_type()
    }

    /// Writes a property, checking it first under [`ValidationPolicy::OnWrite`].
    ///
    /// # Errors
    /// Returns [`ModelError::Validation`] when the write breaks the schema.
    pub fn set_property_value(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        let owner = self.fully_qualified_type().to_owned();
        self.body.set(&owner, name, value.into())
    }

    /// Appends to an array-declared field.
    ///
    /// # Errors
    /// See [`Resource::add_array_value`].
    pub fn add_array_value(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        let owner = self.fully_qualified_type().to_owned();
        self.body.add(&owner, name, value.into())
    }

    /// # Errors
    /// Returns the first [`ModelError::Validation`] encountered.
    pub fn validate(&self) -> Result<(), ModelError> {
        ResourceValidator::default().validate(NodeRef::Concept(self))
    }

    pub(crate) fn set_unchecked(&mut self, name: &str, value: Value) {
        self.body.set_unchecked(name, value);
    }

    pub(crate) fn assign_defaults(&mut self) -> Result<(), ModelError> {
        self.body.assign_defaults()
    }
}

impl PartialEq for Concept {
    fn eq(&self, other: &Self) -> bool {
        self.fully_qualified_type() == other.fully_qualified_type()
            && self.body.properties == other.body.properties
    }
}

impl fmt::Debug for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Concept")
            .field("type", &self.fully_qualified_type())
            .field("properties", &self.body.properties)
            .field("policy", &self.body.policy)
            .finish()
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Concept {{{}}}", self.fully_qualified_type())
    }
}
