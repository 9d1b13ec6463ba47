use crate::property::{self, Property};
use crate::visitor::Visitor;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The kind of a model declaration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeclarationKind {
    Asset,
    Participant,
    Transaction,
    Event,
    Concept,
    Enum,
}

impl DeclarationKind {
    /// Kinds whose instances carry an identifier.
    #[must_use]
    pub const fn is_identifiable(self) -> bool {
        !matches!(self, Self::Concept | Self::Enum)
    }
}

/// A resolved class (or enum) declaration.
///
/// Instances are produced by [`crate::ModelManager`] when a model file is registered and
/// are immutable afterwards. Property lists and the supertype chain are flattened at
/// resolution time, so lookups never touch the registry.
#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub(crate) namespace: String,
    pub(crate) name: String,
    pub(crate) fqn: String,
    pub(crate) kind: DeclarationKind,
    pub(crate) is_abstract: bool,
    pub(crate) system: bool,
    pub(crate) super_type: Option<String>,
    pub(crate) super_types: Vec<String>,
    pub(crate) identifier_field_name: Option<String>,
    pub(crate) own_properties: Vec<Property>,
    pub(crate) properties: Vec<Property>,
    pub(crate) enum_values: Vec<String>,
}

impl ClassDeclaration {
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fully_qualified_name(&self) -> &str {
        &self.fqn
    }

    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        self.kind
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[must_use]
    pub const fn is_concept(&self) -> bool {
        matches!(self.kind, DeclarationKind::Concept)
    }

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, DeclarationKind::Enum)
    }

    #[must_use]
    pub const fn is_transaction(&self) -> bool {
        matches!(self.kind, DeclarationKind::Transaction)
    }

    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self.kind, DeclarationKind::Event)
    }

    /// Declared in the built-in system namespace.
    #[must_use]
    pub const fn is_system_type(&self) -> bool {
        self.system
    }

    /// Fully qualified name of the direct supertype.
    #[must_use]
    pub fn super_type(&self) -> Option<&str> {
        self.super_type.as_deref()
    }

    /// All supertypes, nearest first.
    #[must_use]
    pub fn super_types(&self) -> &[String] {
        &self.super_types
    }

    /// The identifying field, declared here or inherited.
    #[must_use]
    pub fn identifier_field_name(&self) -> Option<&str> {
        self.identifier_field_name.as_deref()
    }

    #[must_use]
    pub fn own_properties(&self) -> &[Property] {
        &self.own_properties
    }

    /// Own properties followed by inherited ones, each group in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        property::find(self, name)
    }

    /// Member names of an enum declaration; empty for classes.
    #[must_use]
    pub fn enum_values(&self) -> &[String] {
        &self.enum_values
    }

    /// Whether this declaration is `fqn` or inherits from it.
    #[must_use]
    pub fn is_assignable_to(&self, fqn: &str) -> bool {
        self.fqn == fqn || self.super_types.iter().any(|s| s == fqn)
    }

    /// Dispatches to `visit_enum_declaration` or `visit_class_declaration`.
    ///
    /// # Errors
    /// Propagates whatever the visitor returns.
    pub fn accept<P, V>(&self, visitor: &V, params: &mut P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        match self.kind {
            DeclarationKind::Enum => visitor.visit_enum_declaration(self, params),
            _ => visitor.visit_class_declaration(self, params),
        }
    }
}
