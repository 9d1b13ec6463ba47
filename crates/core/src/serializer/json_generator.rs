use crate::error::ModelError;
use crate::model::{Identifiable, NodeRef, Value, format_date_time};
use crate::serializer::json_writer::JsonWriter;
use crate::typed_stack::TypedStack;
use fxhash::FxHashSet;
use mgraph_introspect::{ClassDeclaration, Field, RelationshipDeclaration, Visitor};
use tracing::trace;

/// Converts an instance graph into JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGenerator {
    convert_resources_to_relationships: bool,
    permit_resources_for_relationships: bool,
    deduplicate_resources: bool,
}

/// Per-traversal state.
#[derive(Debug, Default)]
pub struct GeneratorParams<'a> {
    pub(crate) stack: TypedStack<NodeRef<'a>>,
    pub(crate) writer: JsonWriter,
    /// Resources inlined through relationship fields on the current path.
    pub(crate) seen_resources: FxHashSet<String>,
    /// URIs of resources already written in full, when deduplicating.
    pub(crate) dedupe_resources: FxHashSet<String>,
}

impl JsonGenerator {
    #[must_use]
    pub const fn new(
        convert_resources_to_relationships: bool,
        permit_resources_for_relationships: bool,
        deduplicate_resources: bool,
    ) -> Self {
        Self {
            convert_resources_to_relationships,
            permit_resources_for_relationships,
            deduplicate_resources,
        }
    }

    /// Writes `node` and returns the accumulated text.
    ///
    /// # Errors
    /// Returns [`ModelError::Generation`] when the graph cannot be expressed, e.g. a resource
    /// in a relationship field without permission to convert or inline it.
    pub fn generate(&self, node: NodeRef<'_>) -> Result<String, ModelError> {
        let Some(typed) = node.typed() else {
            return Err(not_an_instance(node));
        };
        let declaration = typed.class_declaration();
        let mut params = GeneratorParams::default();
        params.stack.push(node)?;
        declaration.accept(self, &mut params)?;
        Ok(params.writer.into_string())
    }

    fn write_item<'a>(
        &self,
        item: NodeRef<'a>,
        params: &mut GeneratorParams<'a>,
    ) -> Result<(), ModelError> {
        match item {
            NodeRef::Value(value) => write_primitive(value, params),
            NodeRef::Relationship(r) => params.writer.write_string(&r.to_uri()),
            NodeRef::Resource(_) | NodeRef::Concept(_) => self.write_instance(item, params),
        }
    }

    fn write_instance<'a>(
        &self,
        item: NodeRef<'a>,
        params: &mut GeneratorParams<'a>,
    ) -> Result<(), ModelError> {
        let Some(typed) = item.typed() else {
            return Err(not_an_instance(item));
        };
        params.stack.push(item)?;
        typed.class_declaration().accept(self, params)
    }

    fn write_relationship<'a>(
        &self,
        relationship: &RelationshipDeclaration,
        item: NodeRef<'a>,
        params: &mut GeneratorParams<'a>,
    ) -> Result<(), ModelError> {
        match item {
            NodeRef::Relationship(r) => params.writer.write_string(&r.to_uri()),
            NodeRef::Resource(r) if self.permit_resources_for_relationships => {
                let fqi = r.fully_qualified_identifier();
                if params.seen_resources.contains(&fqi) {
                    return params.writer.write_string(&r.to_uri());
                }
                params.seen_resources.insert(fqi.clone());
                self.write_instance(item, params)?;
                params.seen_resources.remove(&fqi);
                Ok(())
            },
            NodeRef::Resource(r) if self.convert_resources_to_relationships => {
                params.writer.write_string(&r.to_uri())
            },
            other => Err(ModelError::generation(format!(
                "Did not find a relationship for {} found {}",
                relationship.fully_qualified_type_name(),
                describe(other)
            ))),
        }
    }
}

impl<'a> Visitor<GeneratorParams<'a>> for JsonGenerator {
    type Output = ();
    type Error = ModelError;

    fn visit_class_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut GeneratorParams<'a>,
    ) -> Result<(), ModelError> {
        let node = params.stack.pop()?;
        let properties = match node {
            NodeRef::Resource(r) => r.properties(),
            NodeRef::Concept(c) => c.properties(),
            other => return Err(not_an_instance(other)),
        };

        let mut id = None;
        if let NodeRef::Resource(r) = node {
            if self.deduplicate_resources {
                let uri = r.to_uri();
                if params.dedupe_resources.contains(&uri) {
                    trace!(uri, "writing repeated resource by reference");
                    return params.writer.write_string(&uri);
                }
                params.dedupe_resources.insert(uri.clone());
                id = Some(uri);
            }
        }

        params.writer.open_object();
        params.writer.write_key("$class")?;
        params.writer.write_string(declaration.fully_qualified_name())?;
        if let Some(uri) = id {
            params.writer.write_key("$id")?;
            params.writer.write_string(&uri)?;
        }

        for property in declaration.properties() {
            if let Some(value) = properties.get(property.name()) {
                params.writer.write_key(property.name())?;
                params.stack.push(NodeRef::from_value(value))?;
                property.accept(self, params)?;
            }
        }
        params.writer.close_object();
        Ok(())
    }

    fn visit_enum_declaration(
        &self,
        _declaration: &ClassDeclaration,
        params: &mut GeneratorParams<'a>,
    ) -> Result<(), ModelError> {
        match params.stack.pop()? {
            NodeRef::Value(value) => write_primitive(value, params),
            other => Err(ModelError::generation(format!(
                "Expected an enum member, but found {}",
                describe(other)
            ))),
        }
    }

    fn visit_field(
        &self,
        field: &Field,
        params: &mut GeneratorParams<'a>,
    ) -> Result<(), ModelError> {
        match params.stack.pop()? {
            NodeRef::Value(Value::Array(items)) if field.is_array() => {
                params.writer.open_array();
                for item in items {
                    self.write_item(NodeRef::from_value(item), params)?;
                }
                params.writer.close_array();
                Ok(())
            },
            item => self.write_item(item, params),
        }
    }

    fn visit_relationship_declaration(
        &self,
        relationship: &RelationshipDeclaration,
        params: &mut GeneratorParams<'a>,
    ) -> Result<(), ModelError> {
        match params.stack.pop()? {
            NodeRef::Value(Value::Array(items)) if relationship.is_array() => {
                params.writer.open_array();
                for item in items {
                    self.write_relationship(relationship, NodeRef::from_value(item), params)?;
                }
                params.writer.close_array();
                Ok(())
            },
            item => self.write_relationship(relationship, item, params),
        }
    }
}

/// Numbers and booleans are written bare; a non-finite double therefore yields invalid text.
fn write_primitive(value: &Value, params: &mut GeneratorParams<'_>) -> Result<(), ModelError> {
    match value {
        Value::DateTime(d) => params.writer.write_string(&format_date_time(d)),
        Value::Integer(_) | Value::Double(_) | Value::Boolean(_) => {
            params.writer.write_raw(&value.to_string());
            Ok(())
        },
        Value::Array(items) => {
            params.writer.open_array();
            for item in items {
                write_primitive(item, params)?;
            }
            params.writer.close_array();
            Ok(())
        },
        other => params.writer.write_string(&other.to_string()),
    }
}

fn not_an_instance(node: NodeRef<'_>) -> ModelError {
    ModelError::generation(format!(
        "Expected a Resource or a Concept, but found {}",
        describe(node)
    ))
}

fn describe(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::Resource(r) => r.to_string(),
        NodeRef::Concept(c) => c.to_string(),
        NodeRef::Relationship(r) => r.to_string(),
        NodeRef::Value(v) => v.to_string(),
    }
}
