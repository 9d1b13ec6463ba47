use std::borrow::Cow;

/// Errors that can occur while configuring or initializing logging.
#[mgraph_derive::mgraph_error]
pub enum LoggerError {
    /// Failure when configuring the rolling file appender (e.g., invalid path).
    #[error("Rolling file appender error{}: {source}", format_context(.context))]
    Appender { source: tracing_appender::rolling::InitError, context: Option<Cow<'static, str>> },

    /// Occurs if a global tracing subscriber has already been initialized in the current process.
    #[error("Tracing subscriber error{}: {source}", format_context(.context))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal logic errors.
    #[error("Internal logger error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Invalid configuration supplied to the logger builder.
    #[error("Invalid logger configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A level name outside `none`..`all`.
    #[error("Invalid log level{}: {message}", format_context(.context))]
    InvalidLevel { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A malformed selection element or profile reference.
    #[error("Invalid control string{}: {message}", format_context(.context))]
    InvalidControlString { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
