use crate::error::ModelError;
use crate::model::{Identifiable, Typed};
use mgraph_introspect::{ModelManager, model_util};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;
use std::fmt;
use url::Url;

/// URI scheme of serialized relationships.
pub const RESOURCE_SCHEME: &str = "resource";

/// What a URI fragment cannot carry verbatim, plus `%` itself. Non-ASCII is always encoded.
const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`').add(b'%');

/// A typed pointer to a resource. It never carries the target's fields.
#[derive(Debug, Clone)]
pub struct Relationship {
    typed: Typed,
    identifier: String,
}

impl Relationship {
    pub(crate) fn new(typed: Typed, identifier: impl Into<String>) -> Self {
        Self { typed, identifier: identifier.into() }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        self.typed.namespace()
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.typed.type_name()
    }

    /// Parses a relationship reference.
    ///
    /// Accepts `resource:ns.Type#id`, the legacy `ns.Type#id` (split at the first `#`) and
    /// a bare `id`, for which `default_namespace` and `default_type` supply the rest.
    ///
    /// # Errors
    /// [`ModelError::InvalidUri`] for unparseable or unsupported URIs and missing parts,
    /// [`ModelError::Introspect`] when the type does not resolve.
    pub fn from_uri(
        model_manager: &ModelManager,
        uri: &str,
        default_namespace: Option<&str>,
        default_type: Option<&str>,
    ) -> Result<Self, ModelError> {
        let (namespace, type_name, id) = if has_scheme(uri) {
            parse_resource_uri(uri)?
        } else if let Some((fqn, id)) = uri.split_once('#') {
            (
                model_util::get_namespace(fqn).to_owned(),
                model_util::get_short_name(fqn).to_owned(),
                id.to_owned(),
            )
        } else {
            (
                default_namespace.unwrap_or_default().to_owned(),
                default_type.unwrap_or_default().to_owned(),
                uri.to_owned(),
            )
        };

        if namespace.is_empty() {
            return Err(ModelError::invalid_uri(format!("Missing namespace in URI: {uri}")));
        }
        if type_name.is_empty() {
            return Err(ModelError::invalid_uri(format!("Missing type in URI: {uri}")));
        }
        if id.is_empty() {
            return Err(ModelError::invalid_uri(format!("Missing identifier in URI: {uri}")));
        }

        let fqn = model_util::fully_qualified_name(&namespace, &type_name);
        let declaration = model_manager.get_type(&fqn)?;
        Ok(Self::new(Typed::new(model_manager.clone(), declaration), id))
    }
}

impl Identifiable for Relationship {
    fn typed(&self) -> &Typed {
        &self.typed
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.fully_qualified_type() == other.fully_qualified_type()
            && self.identifier == other.identifier
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Relationship {{id={}}}", self.fully_qualified_identifier())
    }
}

pub(crate) fn format_uri(fully_qualified_type: &str, identifier: &str) -> String {
    format!("{RESOURCE_SCHEME}:{fully_qualified_type}#{}", encode_fragment(identifier))
}

fn encode_fragment(identifier: &str) -> String {
    utf8_percent_encode(identifier, FRAGMENT).to_string()
}

/// A scheme is a letter followed by letters, digits, `+`, `-` or `.` before the first `:`.
fn has_scheme(uri: &str) -> bool {
    uri.split_once(':').is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn parse_resource_uri(uri: &str) -> Result<(String, String, String), ModelError> {
    let parsed = Url::parse(uri)
        .map_err(|e| ModelError::invalid_uri(format!("Invalid URI: {uri} ({e})")))?;

    if parsed.scheme() != RESOURCE_SCHEME {
        return Err(ModelError::invalid_uri(format!(
            "Invalid URI scheme {}: {uri}",
            parsed.scheme()
        )));
    }
    if parsed.has_host()
        || !parsed.username().is_empty()
        || parsed.password().is_some()
        || parsed.port().is_some()
        || parsed.query().is_some()
    {
        return Err(ModelError::invalid_uri(format!("Invalid resource URI format: {uri}")));
    }

    let decode = |part: &str| {
        percent_decode_str(part)
            .decode_utf8()
            .map(Cow::into_owned)
            .map_err(|e| ModelError::invalid_uri(format!("Invalid URI: {uri} ({e})")))
    };
    let fqn = decode(parsed.path())?;
    let id = decode(parsed.fragment().unwrap_or_default())?;

    Ok((
        model_util::get_namespace(&fqn).to_owned(),
        model_util::get_short_name(&fqn).to_owned(),
        id,
    ))
}
