use rsvp_derive::rsvp_error;
use std::borrow::Cow;

#[rsvp_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> std::result::Result<String, DemoError> {
    std::fs::read_to_string("/definitely/missing").context("reading guests")
}

fn main() {
    let err = read().unwrap_err();
    assert!(err.to_string().contains("(reading guests)"));

    let internal: DemoError = "boom".into();
    assert_eq!(internal.to_string(), "Internal error: boom");

    let owned: std::result::Result<(), DemoError> = Err(format!("code {}", 7).into());
    let annotated = owned.context("stage two").unwrap_err();
    assert_eq!(annotated.to_string(), "Internal error (stage two): code 7");
}
