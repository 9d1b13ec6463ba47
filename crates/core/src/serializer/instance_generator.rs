use crate::error::ModelError;
use crate::factory::{Factory, FactoryOptions};
use crate::model::{Instance, Value};
use crate::serializer::value_generator::{GenerateMode, ValueGenerator};
use crate::typed_stack::TypedStack;
use mgraph_introspect::{
    ClassDeclaration, Field, FieldTarget, FieldValidator, PrimitiveType, RelationshipDeclaration,
    Visitor,
};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::trace;

/// Fills the unset properties of an instance with generated values.
#[derive(Debug)]
pub struct InstanceGenerator {
    values: RefCell<Box<dyn ValueGenerator>>,
}

/// Per-traversal state.
#[derive(Debug)]
pub struct GenerationParams<'f> {
    stack: TypedStack<Instance>,
    factory: &'f Factory,
    /// Options for the nested instances created along the way; never generating.
    options: FactoryOptions,
    include_optional_fields: bool,
    /// Fully qualified types (and their supertypes) on the current recursion path.
    seen: Vec<String>,
}

impl InstanceGenerator {
    #[must_use]
    pub fn new(mode: GenerateMode) -> Self {
        Self::with_values(mode.value_generator())
    }

    #[must_use]
    pub fn with_values(values: Box<dyn ValueGenerator>) -> Self {
        Self { values: RefCell::new(values) }
    }

    /// Generates every unset property of `instance`, recursing into nested types.
    ///
    /// Optional properties stay unset unless `options.include_optional_fields`.
    ///
    /// # Errors
    /// [`ModelError::RecursiveModel`] when a required, non-array property re-enters a type on
    /// the current path; resolution errors for abstract types without a concrete subtype.
    pub fn populate(
        &self,
        factory: &Factory,
        instance: Instance,
        options: &FactoryOptions,
    ) -> Result<Instance, ModelError> {
        let declaration = Arc::clone(instance.class_declaration());
        let mut params = GenerationParams {
            stack: TypedStack::with(instance)?,
            factory,
            options: FactoryOptions { generate: None, ..*options },
            include_optional_fields: options.include_optional_fields,
            seen: Vec::new(),
        };
        let value = declaration.accept(self, &mut params)?;
        value.map_or_else(|| Err("generation produced no instance".into()), Instance::try_from)
    }

    fn nested_instance(
        &self,
        field: &Field,
        params: &mut GenerationParams<'_>,
    ) -> Result<Value, ModelError> {
        let factory = params.factory;
        let declared = factory.model_manager().get_type(field.fully_qualified_type_name())?;
        let declaration = factory.resolve_concrete(declared)?;
        let (namespace, name) = (declaration.namespace(), declaration.name());
        let instance = if declaration.is_concept() {
            Instance::Concept(factory.new_concept(namespace, name, &params.options)?)
        } else {
            let id = self.identifier(&declaration);
            Instance::Resource(factory.new_resource(namespace, name, &id, &params.options)?)
        };
        params.stack.push(instance)?;
        declaration.accept(self, params)?.ok_or_else(|| "generation produced no instance".into())
    }

    fn identifier(&self, declaration: &ClassDeclaration) -> String {
        let field = declaration.identifier_field_name().unwrap_or("id");
        format!("{field}:{:04}", self.values.borrow_mut().identifier_index())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn primitive(&self, field: &Field, primitive: PrimitiveType) -> Value {
        let mut values = self.values.borrow_mut();
        let range = match field.validator() {
            Some(FieldValidator::Range { lower, upper }) => Some((*lower, *upper)),
            _ => None,
        };
        match primitive {
            PrimitiveType::String => Value::String(values.string()),
            PrimitiveType::Boolean => Value::Boolean(values.boolean()),
            PrimitiveType::DateTime => Value::DateTime(values.date_time()),
            PrimitiveType::Double => Value::Double(clamp(values.double(), range)),
            PrimitiveType::Integer | PrimitiveType::Long => {
                let n =
                    if primitive == PrimitiveType::Long { values.long() } else { values.integer() };
                let Some((lower, upper)) = range else { return Value::Integer(n) };
                let bounds = (lower.map(f64::ceil), upper.map(f64::floor));
                Value::Integer(clamp(n as f64, Some(bounds)) as i64)
            },
        }
    }

    fn item(&self, field: &Field, params: &mut GenerationParams<'_>) -> Result<Value, ModelError> {
        match field.target() {
            FieldTarget::Primitive(primitive) => Ok(self.primitive(field, primitive)),
            FieldTarget::Enum => {
                let model_manager = params.factory.model_manager();
                let declaration = model_manager.get_type(field.fully_qualified_type_name())?;
                let member = self.values.borrow_mut().enum_value(declaration.enum_values());
                member.map(|m| Value::String(m.to_owned())).ok_or_else(|| {
                    let fqn = declaration.fully_qualified_name();
                    ModelError::generation(format!("Enumeration {fqn} has no values"))
                })
            },
            FieldTarget::Class => self.nested_instance(field, params),
        }
    }
}

fn clamp(value: f64, range: Option<(Option<f64>, Option<f64>)>) -> f64 {
    let Some((lower, upper)) = range else { return value };
    let value = lower.map_or(value, |lo| value.max(lo));
    upper.map_or(value, |hi| value.min(hi))
}

impl<'f> Visitor<GenerationParams<'f>> for InstanceGenerator {
    type Output = Option<Value>;
    type Error = ModelError;

    fn visit_class_declaration(
        &self,
        _declaration: &ClassDeclaration,
        params: &mut GenerationParams<'f>,
    ) -> Result<Option<Value>, ModelError> {
        let mut instance = params.stack.pop()?;
        let declaration = Arc::clone(instance.class_declaration());
        trace!(class = declaration.fully_qualified_name(), "generating instance");

        let mark = params.seen.len();
        params.seen.push(declaration.fully_qualified_name().to_owned());
        params.seen.extend(declaration.super_types().iter().cloned());
        for property in declaration.properties() {
            if instance.get_property_value(property.name()).is_some() {
                continue;
            }
            if property.is_optional() && !params.include_optional_fields {
                continue;
            }
            if let Some(value) = property.accept(self, params)? {
                instance.set_unchecked(property.name(), value);
            }
        }
        params.seen.truncate(mark);
        Ok(Some(instance.into_value()))
    }

    fn visit_enum_declaration(
        &self,
        declaration: &ClassDeclaration,
        _params: &mut GenerationParams<'f>,
    ) -> Result<Option<Value>, ModelError> {
        let member = self.values.borrow_mut().enum_value(declaration.enum_values());
        Ok(member.map(|m| Value::String(m.to_owned())))
    }

    fn visit_field(
        &self,
        field: &Field,
        params: &mut GenerationParams<'f>,
    ) -> Result<Option<Value>, ModelError> {
        let recursive = field.target() == FieldTarget::Class
            && params.seen.iter().any(|fqn| fqn == field.fully_qualified_type_name());
        if recursive {
            return match (field.is_array(), field.is_optional()) {
                (true, _) => Ok(Some(Value::Array(Vec::new()))),
                (false, true) => Ok(None),
                (false, false) => Err(ModelError::RecursiveModel {
                    message: format!(
                        "Model is recursive: field {} of type {} re-enters {}",
                        field.name(),
                        field.parent(),
                        field.fully_qualified_type_name()
                    )
                    .into(),
                    context: None,
                }),
            };
        }

        if field.is_array() {
            let length = self.values.borrow().array_length();
            let items =
                (0..length).map(|_| self.item(field, params)).collect::<Result<Vec<_>, _>>()?;
            return Ok(Some(Value::Array(items)));
        }
        self.item(field, params).map(Some)
    }

    fn visit_relationship_declaration(
        &self,
        relationship: &RelationshipDeclaration,
        params: &mut GenerationParams<'f>,
    ) -> Result<Option<Value>, ModelError> {
        let factory = params.factory;
        let declaration =
            factory.model_manager().get_type(relationship.fully_qualified_type_name())?;
        let pointer = || {
            let id = self.identifier(&declaration);
            let (namespace, name) = (declaration.namespace(), declaration.name());
            factory.new_relationship(namespace, name, &id).map(Value::from)
        };
        if relationship.is_array() {
            let length = self.values.borrow().array_length();
            let items = (0..length).map(|_| pointer()).collect::<Result<Vec<_>, _>>()?;
            return Ok(Some(Value::Array(items)));
        }
        pointer().map(Some)
    }
}
