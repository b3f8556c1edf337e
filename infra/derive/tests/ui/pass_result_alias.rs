use std::borrow::Cow;

mod error {
    use std::borrow::Cow;

    #[rsvp_derive::rsvp_error]
    pub enum ParseError {
        #[error("Bad number{}: {source}", format_context(.context))]
        Number { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },
    }
}

use error::{ParseErrorExt, Result};

fn parse(raw: &str) -> Result<i64> {
    raw.parse::<i64>().context(Cow::Owned(format!("parsing '{raw}'")))
}

fn main() {
    assert_eq!(parse("42").ok(), Some(42));
    let err = parse("x").unwrap_err();
    assert!(matches!(err, error::ParseError::Number { .. }));
}
