use std::borrow::Cow;

/// Errors surfaced by the notification core.
#[rsvp_derive::rsvp_error]
pub enum NotifyError {
    /// Required configuration is missing or unusable; fatal at startup.
    #[error("Notification config error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Every attempted recipient failed.
    #[error(
        "No notification delivered{}: all {attempted} attempt(s) failed",
        format_context(.context)
    )]
    NoRecipientsDelivered {
        attempted: usize,
        errors: Vec<String>,
        context: Option<Cow<'static, str>>,
    },
}
