//! Parsed model files as handed to the registry.
//!
//! The model language itself is compiled elsewhere; this module only fixes the shape of
//! its output. Definitions deserialize from JSON (camelCase keys) and can also be
//! assembled in code with the chained constructors.

use crate::declaration::DeclarationKind;
use crate::error::{IntrospectError, IntrospectErrorExt};
use serde::{Deserialize, Serialize};

/// One namespace worth of declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModelFile {
    pub namespace: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub declarations: Vec<DeclarationDefinition>,
}

impl ModelFile {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), imports: Vec::new(), declarations: Vec::new() }
    }

    /// Decodes a model file from its JSON form.
    ///
    /// # Errors
    /// Returns [`IntrospectError::Definition`] when the text is not a valid definition.
    pub fn from_json(text: &str) -> Result<Self, IntrospectError> {
        serde_json::from_str(text).context("Decoding model file")
    }

    /// Imports a fully qualified type from another namespace.
    #[must_use]
    pub fn import(mut self, fqn: impl Into<String>) -> Self {
        self.imports.push(fqn.into());
        self
    }

    #[must_use]
    pub fn declare(mut self, declaration: DeclarationDefinition) -> Self {
        self.declarations.push(declaration);
        self
    }
}

/// A single declaration inside a [`ModelFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeclarationDefinition {
    pub kind: DeclarationKind,
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub identified_by: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub values: Vec<String>,
}

impl DeclarationDefinition {
    #[must_use]
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            is_abstract: false,
            extends: None,
            identified_by: None,
            properties: Vec::new(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn asset(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Asset, name)
    }

    #[must_use]
    pub fn participant(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Participant, name)
    }

    #[must_use]
    pub fn transaction(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Transaction, name)
    }

    #[must_use]
    pub fn event(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Event, name)
    }

    #[must_use]
    pub fn concept(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Concept, name)
    }

    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut decl = Self::new(DeclarationKind::Enum, name);
        decl.values = values.into_iter().map(Into::into).collect();
        decl
    }

    #[must_use]
    pub const fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn extends(mut self, super_type: impl Into<String>) -> Self {
        self.extends = Some(super_type.into());
        self
    }

    #[must_use]
    pub fn identified_by(mut self, field: impl Into<String>) -> Self {
        self.identified_by = Some(field.into());
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }
}

/// A property line inside a [`DeclarationDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub relationship: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub range: Option<(Option<f64>, Option<f64>)>,
}

impl PropertyDefinition {
    #[must_use]
    pub fn field(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            array: false,
            optional: false,
            relationship: false,
            default: None,
            regex: None,
            range: None,
        }
    }

    #[must_use]
    pub fn relationship(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut def = Self::field(name, type_name);
        def.relationship = true;
        def
    }

    #[must_use]
    pub const fn array(mut self) -> Self {
        self.array = true;
        self
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    #[must_use]
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    #[must_use]
    pub const fn range(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.range = Some((lower, upper));
        self
    }
}
