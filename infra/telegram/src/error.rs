use rsvp_notify::TransportError;
use std::borrow::Cow;

#[rsvp_derive::rsvp_error]
pub enum TelegramError {
    #[error("HTTP error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The Bot API answered with `ok: false`.
    #[error("Bot API error {code}{}: {message}", format_context(.context))]
    Api { code: i64, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Decode error{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<TelegramError> for TransportError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::Api { .. } => {
                Self::Rejected { message: err.to_string().into(), context: None }
            },
            TelegramError::Http { .. } | TelegramError::Decode { .. } | TelegramError::Internal { .. } => {
                Self::Network { message: err.to_string().into(), context: None }
            },
        }
    }
}
