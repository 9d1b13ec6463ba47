use std::borrow::Cow;

/// Errors raised while registering model files or resolving type names.
#[mgraph_derive::mgraph_error]
pub enum IntrospectError {
    /// The namespace of a fully qualified type name is not registered.
    #[error("Unresolved namespace{}: {message}", format_context(.context))]
    NamespaceNotRegistered { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The namespace is registered but declares no type with that name.
    #[error("Undeclared type{}: {message}", format_context(.context))]
    TypeNotDeclared { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A model file failed structural checks and was not registered.
    #[error("Illegal model{}: {message}", format_context(.context))]
    IllegalModel { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A model file definition could not be decoded.
    #[error("Model definition error{}: {source}", format_context(.context))]
    Definition { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal introspection error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IntrospectError {
    pub(crate) fn illegal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::IllegalModel { message: message.into(), context: None }
    }
}
