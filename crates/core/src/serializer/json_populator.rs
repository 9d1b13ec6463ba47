use crate::error::{ModelError, ViolationKind};
use crate::factory::{Factory, FactoryOptions};
use crate::model::{Instance, Relationship, Value};
use crate::typed_stack::{StackValue, TypedStack};
use chrono::{DateTime, Utc};
use mgraph_introspect::{
    ClassDeclaration, Field, FieldTarget, PrimitiveType, RelationshipDeclaration, Visitor,
    model_util,
};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::trace;

/// Discriminator key carrying an object's fully qualified type.
pub const CLASS_KEY: &str = "$class";

/// Coarse kind of a JSON node on the populator's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl StackValue for &Json {
    type Kind = JsonKind;

    fn kind(&self) -> JsonKind {
        match self {
            Json::Null => JsonKind::Null,
            Json::Bool(_) => JsonKind::Bool,
            Json::Number(_) => JsonKind::Number,
            Json::String(_) => JsonKind::String,
            Json::Array(_) => JsonKind::Array,
            Json::Object(_) => JsonKind::Object,
        }
    }

    fn is_null(&self) -> bool {
        Json::is_null(self)
    }
}

/// Builds an instance graph from a JSON tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPopulator {
    accept_resources_for_relationships: bool,
}

/// Per-traversal state.
#[derive(Debug)]
pub struct PopulatorParams<'j, 'f> {
    json_stack: TypedStack<&'j Json>,
    resource_stack: TypedStack<Instance>,
    factory: &'f Factory,
    options: FactoryOptions,
}

impl JsonPopulator {
    #[must_use]
    pub const fn new(accept_resources_for_relationships: bool) -> Self {
        Self { accept_resources_for_relationships }
    }

    /// Assigns the members of `json` onto `instance`, creating nested instances as needed.
    ///
    /// # Errors
    /// [`ModelError::Validation`] for keys the type does not declare,
    /// [`ModelError::MalformedInput`] for values that do not fit their property,
    /// [`ModelError::MissingClassDiscriminator`] for inline resources without `$class`.
    pub fn populate(
        &self,
        factory: &Factory,
        instance: Instance,
        json: &Json,
    ) -> Result<Instance, ModelError> {
        let declaration = Arc::clone(instance.class_declaration());
        let mut params = PopulatorParams {
            json_stack: TypedStack::with(json)?,
            resource_stack: TypedStack::with(instance)?,
            factory,
            options: FactoryOptions { allow_empty_id: true, ..FactoryOptions::default() },
        };
        let value = declaration.accept(self, &mut params)?;
        value.map_or_else(|| Err("population produced no instance".into()), Instance::try_from)
    }

    /// Creates the instance described by `json`, typed by `$class` or else `declared_type`.
    fn instantiate<'j>(
        &self,
        declared_type: &str,
        json: &'j Json,
        params: &mut PopulatorParams<'j, '_>,
    ) -> Result<Value, ModelError> {
        if !json.is_object() {
            return Err(ModelError::malformed(format!(
                "Expected a JSON object for type {declared_type}, found {json}"
            )));
        }
        let fqn = match json.get(CLASS_KEY) {
            Some(Json::String(class)) => class.as_str(),
            Some(other) => {
                return Err(ModelError::MissingClassDiscriminator {
                    message: format!("Invalid {CLASS_KEY} value {other} for type {declared_type}")
                        .into(),
                    context: None,
                });
            },
            None => declared_type,
        };
        let factory = params.factory;
        let declaration = factory.model_manager().get_type(fqn)?;
        let (namespace, name) = (declaration.namespace(), declaration.name());
        let instance = if declaration.is_concept() {
            Instance::Concept(factory.new_concept(namespace, name, &params.options)?)
        } else {
            let id = declaration
                .identifier_field_name()
                .and_then(|field| json.get(field))
                .and_then(Json::as_str)
                .unwrap_or_default();
            Instance::Resource(factory.new_resource(namespace, name, id, &params.options)?)
        };

        let runtime = Arc::clone(instance.class_declaration());
        params.json_stack.push(json)?;
        params.resource_stack.push(instance)?;
        runtime.accept(self, params)?.ok_or_else(|| "population produced no instance".into())
    }

    fn convert_item<'j>(
        &self,
        field: &Field,
        json: &'j Json,
        params: &mut PopulatorParams<'j, '_>,
    ) -> Result<Value, ModelError> {
        match field.target() {
            FieldTarget::Class => self.instantiate(field.fully_qualified_type_name(), json, params),
            FieldTarget::Enum => match json {
                Json::String(member) => Ok(Value::String(member.clone())),
                other => Err(unexpected_value(field, other, "an enum member name")),
            },
            FieldTarget::Primitive(primitive) => convert_primitive(field, primitive, json),
        }
    }

    fn convert_relationship<'j>(
        &self,
        relationship: &RelationshipDeclaration,
        json: &'j Json,
        params: &mut PopulatorParams<'j, '_>,
    ) -> Result<Value, ModelError> {
        if let Json::String(uri) = json {
            let fqn = relationship.fully_qualified_type_name();
            let pointer = Relationship::from_uri(
                params.factory.model_manager(),
                uri,
                Some(model_util::get_namespace(fqn)),
                Some(model_util::get_short_name(fqn)),
            )?;
            return Ok(Value::from(pointer));
        }
        if !self.accept_resources_for_relationships {
            return Err(ModelError::malformed(format!(
                "Invalid JSON data. Found a value that is not a string: {json} for relationship {}",
                relationship.name()
            )));
        }
        if json.get(CLASS_KEY).is_none() {
            return Err(ModelError::MissingClassDiscriminator {
                message: format!(
                    "Invalid JSON data. Does not contain a {CLASS_KEY} type identifier: {json} for relationship {}",
                    relationship.name()
                )
                .into(),
                context: None,
            });
        }
        self.instantiate(relationship.fully_qualified_type_name(), json, params)
    }
}

impl<'j, 'f> Visitor<PopulatorParams<'j, 'f>> for JsonPopulator {
    type Output = Option<Value>;
    type Error = ModelError;

    fn visit_class_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut PopulatorParams<'j, 'f>,
    ) -> Result<Option<Value>, ModelError> {
        let json = params.json_stack.pop()?;
        let mut instance = params.resource_stack.pop()?;
        let fqn = declaration.fully_qualified_name();
        trace!(class = fqn, "populating instance");

        let Json::Object(members) = json else {
            return Err(ModelError::malformed(format!(
                "Expected a JSON object for type {fqn}, found {json}"
            )));
        };
        let assignable: Vec<(&String, &'j Json)> = members
            .iter()
            .filter(|(key, value)| !model_util::is_system_property(key) && !Json::is_null(value))
            .collect();

        let unexpected: Vec<&str> = assignable
            .iter()
            .filter(|(key, _)| declaration.property(key).is_none())
            .map(|(key, _)| key.as_str())
            .collect();
        if !unexpected.is_empty() {
            return Err(ModelError::violation(
                ViolationKind::UnexpectedProperty,
                format!("Unexpected properties for type {fqn}: {}", unexpected.join(", ")),
            ));
        }

        for (key, value) in assignable {
            let Some(property) = declaration.property(key) else { continue };
            params.json_stack.push(value)?;
            if let Some(converted) = property.accept(self, params)? {
                instance.set_unchecked(key, converted);
            }
        }
        Ok(Some(instance.into_value()))
    }

    fn visit_enum_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut PopulatorParams<'j, 'f>,
    ) -> Result<Option<Value>, ModelError> {
        match params.json_stack.pop()? {
            Json::String(member) => Ok(Some(Value::String(member.clone()))),
            other => Err(ModelError::malformed(format!(
                "Expected a member of {} but found {other}",
                declaration.fully_qualified_name()
            ))),
        }
    }

    fn visit_field(
        &self,
        field: &Field,
        params: &mut PopulatorParams<'j, 'f>,
    ) -> Result<Option<Value>, ModelError> {
        let json = params.json_stack.pop()?;
        if !field.is_array() {
            return self.convert_item(field, json, params).map(Some);
        }
        let Json::Array(items) = json else {
            return Err(unexpected_value(field, json, "an array"));
        };
        let items = items
            .iter()
            .map(|item| self.convert_item(field, item, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Value::Array(items)))
    }

    fn visit_relationship_declaration(
        &self,
        relationship: &RelationshipDeclaration,
        params: &mut PopulatorParams<'j, 'f>,
    ) -> Result<Option<Value>, ModelError> {
        let json = params.json_stack.pop()?;
        if !relationship.is_array() {
            return self.convert_relationship(relationship, json, params).map(Some);
        }
        let Json::Array(items) = json else {
            return Err(ModelError::malformed(format!(
                "Expected an array for relationship {}, found {json}",
                relationship.name()
            )));
        };
        let items = items
            .iter()
            .map(|item| self.convert_relationship(relationship, item, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Value::Array(items)))
    }
}

fn convert_primitive(
    field: &Field,
    primitive: PrimitiveType,
    json: &Json,
) -> Result<Value, ModelError> {
    match primitive {
        PrimitiveType::String => match json {
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Number(n) => Ok(Value::String(n.to_string())),
            Json::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(unexpected_value(field, other, "a string")),
        },
        PrimitiveType::Integer | PrimitiveType::Long => {
            let parsed = match json {
                Json::Number(n) => n.as_i64(),
                Json::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            parsed.map(Value::Integer).ok_or_else(|| unexpected_value(field, json, "an integer"))
        },
        PrimitiveType::Double => {
            let parsed = match json {
                Json::Number(n) => n.as_f64(),
                Json::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            parsed.map(Value::Double).ok_or_else(|| unexpected_value(field, json, "a number"))
        },
        PrimitiveType::Boolean => Ok(Value::Boolean(match json {
            Json::Bool(b) => *b,
            Json::String(s) => s == "true",
            _ => false,
        })),
        PrimitiveType::DateTime => {
            let parsed = match json {
                Json::String(s) => {
                    DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc))
                },
                Json::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
                _ => None,
            };
            parsed
                .map(Value::DateTime)
                .ok_or_else(|| unexpected_value(field, json, "an RFC 3339 date-time"))
        },
    }
}

fn unexpected_value(field: &Field, json: &Json, expected: &str) -> ModelError {
    ModelError::malformed(format!(
        "Invalid JSON data for field {} of {}. Expected {expected}, found {json}",
        field.name(),
        field.parent()
    ))
}
