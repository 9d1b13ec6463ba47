use crate::error::{ModelError, ViolationKind};
use crate::model::{Identifiable, NodeRef, Value};
use crate::typed_stack::TypedStack;
use mgraph_introspect::{
    ClassDeclaration, Field, FieldTarget, ModelManager, PrimitiveType, Property,
    RelationshipDeclaration, Visitor, model_util,
};
use tracing::trace;

/// Walks an instance graph and checks it against its declarations.
///
/// The first violation aborts the walk (depth first, declaration order).
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceValidator {
    permit_resources_for_relationships: bool,
}

/// Per-traversal state.
#[derive(Debug)]
pub struct ValidatorParams<'a> {
    pub(crate) stack: TypedStack<NodeRef<'a>>,
    pub(crate) model_manager: &'a ModelManager,
    /// Fully qualified identifier of the innermost enclosing resource, for diagnostics.
    pub(crate) root_resource_identifier: String,
    pub(crate) current_identifier: String,
}

impl<'a> ValidatorParams<'a> {
    pub(crate) fn new(model_manager: &'a ModelManager, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            stack: TypedStack::new(),
            model_manager,
            root_resource_identifier: identifier.clone(),
            current_identifier: identifier,
        }
    }
}

impl ResourceValidator {
    /// A validator that also accepts resources where relationships are declared.
    #[must_use]
    pub const fn permitting_resources(permit: bool) -> Self {
        Self { permit_resources_for_relationships: permit }
    }

    /// Validates a resource or concept and everything reachable from it.
    ///
    /// # Errors
    /// Returns [`ModelError::Validation`] for the first rule broken (a relationship is not an
    /// instance), or [`ModelError::NotTyped`] for plain values.
    pub fn validate(&self, node: NodeRef<'_>) -> Result<(), ModelError> {
        let typed = node.typed().ok_or_else(|| ModelError::NotTyped {
            message: format!("Cannot validate a value of type {}", node.type_label()).into(),
            context: None,
        })?;
        let identifier = match node {
            NodeRef::Resource(r) => r.fully_qualified_identifier(),
            _ => typed.fully_qualified_type().to_owned(),
        };
        let mut params = ValidatorParams::new(typed.model_manager(), identifier);
        params.stack.push(node)?;
        typed.class_declaration().accept(self, &mut params)
    }

    /// Checks one value against a single property of an instance owned by `owner`.
    pub(crate) fn validate_property(
        &self,
        model_manager: &ModelManager,
        owner: &str,
        property: &Property,
        node: NodeRef<'_>,
    ) -> Result<(), ModelError> {
        let mut params = ValidatorParams::new(model_manager, owner);
        params.stack.push(node)?;
        property.accept(self, &mut params)
    }

    fn check_enum<'a>(
        &self,
        field: &Field,
        item: NodeRef<'a>,
        params: &mut ValidatorParams<'a>,
    ) -> Result<(), ModelError> {
        let declaration = params.model_manager.get_type(field.fully_qualified_type_name())?;
        params.stack.push(item)?;
        declaration.accept(self, params)
    }

    fn check_item<'a>(
        &self,
        field: &Field,
        item: NodeRef<'a>,
        params: &mut ValidatorParams<'a>,
    ) -> Result<(), ModelError> {
        match field.target() {
            FieldTarget::Enum => self.check_enum(field, item, params),
            FieldTarget::Primitive(primitive) => check_primitive(field, primitive, item, params),
            FieldTarget::Class => {
                let typed = item.typed().filter(|_| !matches!(item, NodeRef::Relationship(_)));
                let Some(typed) = typed else {
                    let expected = field_type(field);
                    return Err(field_type_violation(params, field.name(), item, &expected));
                };
                let expected = field.fully_qualified_type_name();
                if !typed.instance_of(expected) {
                    return Err(invalid_assignment(params, field.name(), item, expected));
                }
                params.stack.push(item)?;
                typed.class_declaration().accept(self, params)
            },
        }
    }

    fn check_relationship(
        &self,
        relationship: &RelationshipDeclaration,
        item: NodeRef<'_>,
        params: &ValidatorParams<'_>,
    ) -> Result<(), ModelError> {
        let typed = match item {
            NodeRef::Relationship(r) => r.typed(),
            NodeRef::Resource(r) if self.permit_resources_for_relationships => r.typed(),
            NodeRef::Concept(c) if self.permit_resources_for_relationships => c.typed(),
            other => {
                return Err(ModelError::violation(
                    ViolationKind::NotARelationship,
                    format!(
                        "Instance {} has a property {} with value {} that is not a relationship to {}",
                        params.root_resource_identifier,
                        relationship.name(),
                        describe(other),
                        relationship.fully_qualified_type_name()
                    ),
                ));
            },
        };
        if typed.class_declaration().is_concept() {
            return Err(ModelError::violation(
                ViolationKind::RelationshipToConceptForbidden,
                "Cannot have a relationship to a concept. Relationships must be to resources.",
            ));
        }
        if !typed.instance_of(relationship.fully_qualified_type_name()) {
            return Err(invalid_assignment(
                params,
                relationship.name(),
                item,
                relationship.fully_qualified_type_name(),
            ));
        }
        Ok(())
    }
}

impl<'a> Visitor<ValidatorParams<'a>> for ResourceValidator {
    type Output = ();
    type Error = ModelError;

    fn visit_class_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut ValidatorParams<'a>,
    ) -> Result<(), ModelError> {
        let node = params.stack.pop()?;
        let (typed, properties, identifier) = match node {
            NodeRef::Resource(r) => (r.typed(), r.properties(), Some(r.identifier())),
            NodeRef::Concept(c) => (c.typed(), c.properties(), None),
            other => {
                return Err(ModelError::violation(
                    ViolationKind::NotAResourceOrConcept,
                    format!(
                        "Model violation in instance {} class {} has value {} expected a resource or concept",
                        params.root_resource_identifier,
                        declaration.fully_qualified_name(),
                        describe(other)
                    ),
                ));
            },
        };

        let previous = (params.root_resource_identifier.clone(), params.current_identifier.clone());
        if let NodeRef::Resource(r) = node {
            params.root_resource_identifier = r.fully_qualified_identifier();
        }

        // The registry may have changed since the instance was created.
        let runtime = params.model_manager.get_type(typed.fully_qualified_type())?;
        let fqn = runtime.fully_qualified_name();
        trace!(class = fqn, "validating instance");

        if runtime.is_abstract() {
            return Err(ModelError::violation(
                ViolationKind::AbstractClassInstantiated,
                format!("The class {fqn} is abstract. Should not have an instance!"),
            ));
        }

        for name in properties.keys() {
            if !model_util::is_system_property(name) && runtime.property(name).is_none() {
                let owner = match identifier {
                    Some(id) => id,
                    None => params.current_identifier.as_str(),
                };
                return Err(ModelError::violation(
                    ViolationKind::UndeclaredField,
                    format!(
                        "Instance {owner} has a property named {name} which is not declared in {fqn}"
                    ),
                ));
            }
        }

        if let Some(id) = identifier {
            if id.trim().is_empty() {
                return Err(ModelError::violation(
                    ViolationKind::EmptyIdentifier,
                    format!(
                        "Instance {} has an empty identifier!",
                        params.root_resource_identifier
                    ),
                ));
            }
            params.current_identifier.clone_from(&params.root_resource_identifier);
        }

        for property in runtime.properties() {
            match properties.get(property.name()) {
                Some(value) => {
                    params.stack.push(NodeRef::from_value(value))?;
                    property.accept(self, params)?;
                },
                None if property.is_optional() => {},
                None => {
                    return Err(ModelError::violation(
                        ViolationKind::MissingRequiredField,
                        format!(
                            "Instance {} missing required field {}",
                            params.root_resource_identifier,
                            property.name()
                        ),
                    ));
                },
            }
        }

        (params.root_resource_identifier, params.current_identifier) = previous;
        Ok(())
    }

    fn visit_enum_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut ValidatorParams<'a>,
    ) -> Result<(), ModelError> {
        let node = params.stack.pop()?;
        let member = match node {
            NodeRef::Value(Value::String(s)) => Some(s.as_str()),
            _ => None,
        };
        if member.is_some_and(|m| declaration.enum_values().iter().any(|v| v == m)) {
            return Ok(());
        }
        Err(ModelError::violation(
            ViolationKind::InvalidEnumValue,
            format!(
                "Instance {} invalid enum value {} for field {}",
                params.root_resource_identifier,
                describe(node),
                declaration.name()
            ),
        ))
    }

    fn visit_field(
        &self,
        field: &Field,
        params: &mut ValidatorParams<'a>,
    ) -> Result<(), ModelError> {
        let node = params.stack.pop()?;
        match (field.is_array(), node) {
            (true, NodeRef::Value(Value::Array(items))) => {
                for item in items {
                    self.check_item(field, NodeRef::from_value(item), params)?;
                }
                Ok(())
            },
            (false, NodeRef::Value(Value::Array(_))) | (true, _) => {
                Err(field_type_violation(params, field.name(), node, &field_type(field)))
            },
            (false, item) => self.check_item(field, item, params),
        }
    }

    fn visit_relationship_declaration(
        &self,
        relationship: &RelationshipDeclaration,
        params: &mut ValidatorParams<'a>,
    ) -> Result<(), ModelError> {
        let node = params.stack.pop()?;
        match (relationship.is_array(), node) {
            (true, NodeRef::Value(Value::Array(items))) => {
                for item in items {
                    self.check_relationship(relationship, NodeRef::from_value(item), params)?;
                }
                Ok(())
            },
            (true, other) => Err(invalid_assignment(
                params,
                relationship.name(),
                other,
                &format!("{}[]", relationship.fully_qualified_type_name()),
            )),
            (false, item) => self.check_relationship(relationship, item, params),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_primitive(
    field: &Field,
    primitive: PrimitiveType,
    item: NodeRef<'_>,
    params: &ValidatorParams<'_>,
) -> Result<(), ModelError> {
    let NodeRef::Value(value) = item else {
        return Err(field_type_violation(params, field.name(), item, &field_type(field)));
    };
    let number = match (primitive, value) {
        (PrimitiveType::String, Value::String(_))
        | (PrimitiveType::Boolean, Value::Boolean(_))
        | (PrimitiveType::DateTime, Value::DateTime(_)) => None,
        (
            PrimitiveType::Integer | PrimitiveType::Long | PrimitiveType::Double,
            Value::Integer(n),
        ) => Some(*n as f64),
        (PrimitiveType::Double, Value::Double(n)) => Some(*n),
        _ => return Err(field_type_violation(params, field.name(), item, &field_type(field))),
    };

    let Some(validator) = field.validator() else { return Ok(()) };
    let accepted = match (value, number) {
        (_, Some(n)) => validator.accepts_number(n),
        (Value::String(s), None) => validator.accepts_str(s),
        _ => true,
    };
    if accepted {
        return Ok(());
    }
    Err(ModelError::violation(
        ViolationKind::ValueConstraint,
        format!(
            "Instance {} field {} has value {value} not {validator}",
            params.current_identifier,
            field.name()
        ),
    ))
}

fn field_type(field: &Field) -> String {
    if field.is_array() { format!("{}[]", field.type_name()) } else { field.type_name().to_owned() }
}

/// The value as shown in diagnostics: identifiers for instances, text otherwise.
fn describe(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::Resource(r) => r.fully_qualified_identifier(),
        NodeRef::Relationship(r) => r.fully_qualified_identifier(),
        NodeRef::Concept(c) => c.to_string(),
        NodeRef::Value(v) => v.to_string(),
    }
}

fn field_type_violation(
    params: &ValidatorParams<'_>,
    property: &str,
    node: NodeRef<'_>,
    expected: &str,
) -> ModelError {
    ModelError::violation(
        ViolationKind::FieldTypeViolation,
        format!(
            "Model violation in instance {} field {property} has value {} ({}) expected type {expected}",
            params.root_resource_identifier,
            describe(node),
            node.type_label()
        ),
    )
}

fn invalid_assignment(
    params: &ValidatorParams<'_>,
    property: &str,
    node: NodeRef<'_>,
    expected: &str,
) -> ModelError {
    ModelError::violation(
        ViolationKind::InvalidFieldAssignment,
        format!(
            "Instance {} has property {property} with type {} that is not derived from {expected}",
            params.root_resource_identifier,
            node.type_label()
        ),
    )
}
