use mgraph_derive::mgraph_error;
use std::borrow::Cow;

#[mgraph_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Lookup error{}: {message}", format_context(.context))]
    Lookup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let from_str: DemoError = "boom".into();
    assert!(matches!(from_str, DemoError::Internal { .. }));

    let from_io: DemoError = std::io::Error::other("disk").into();
    assert!(from_io.context_note().is_none());
}
