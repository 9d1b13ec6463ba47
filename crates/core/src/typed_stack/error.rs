use std::borrow::Cow;

/// Misuse of a [`super::TypedStack`], always a traversal bug rather than bad input.
#[mgraph_derive::mgraph_error]
pub enum StackError {
    /// A null value was pushed, or a pushed value did not have the asserted kind.
    #[error("Stack invariant violated{}: {message}", format_context(.context))]
    InvariantViolation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Stack is empty{}: {message}", format_context(.context))]
    EmptyStack { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The top of the stack does not have the expected kind.
    #[error("Stack type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
