use crate::config::ConfigError;
use mgraph_introspect::IntrospectError;
use mgraph_logger::LoggerError;
use std::borrow::Cow;

/// Failures while assembling a [`crate::Platform`].
#[mgraph_derive::mgraph_error]
pub enum PlatformError {
    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    /// The model files do not resolve into a registry.
    #[error("Model registry error{}: {source}", format_context(.context))]
    Schema { source: IntrospectError, context: Option<Cow<'static, str>> },

    #[error("Logging error{}: {source}", format_context(.context))]
    Logging { source: LoggerError, context: Option<Cow<'static, str>> },
}
