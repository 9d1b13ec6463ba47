use mgraph_derive::mgraph_error;
use std::borrow::Cow;

#[mgraph_error]
pub enum LookupError {
    #[error("Missing{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },
}

fn parse(text: &str) -> Result<i64, LookupError> {
    let value = text.parse::<i64>().context("parsing count")?;
    Ok(value)
}

fn find() -> Result<(), LookupError> {
    Err(LookupError::Missing { message: "key".into(), context: None })
}

fn main() {
    let err = parse("x").unwrap_err();
    assert_eq!(err.context_note(), Some("parsing count"));
    assert!(err.to_string().starts_with("Parse error (parsing count): "));

    let err = find().context("resolving key").unwrap_err();
    assert_eq!(err.to_string(), "Missing (resolving key): key");
}
