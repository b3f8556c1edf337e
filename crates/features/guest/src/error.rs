use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rsvp_notify::NotifyError;
use serde_json::json;
use std::borrow::Cow;
use tracing::{error, warn};

const UNAVAILABLE: &str = "notification service unavailable";

#[rsvp_derive::rsvp_error]
pub enum GuestError {
    /// The body parsed but a field is missing or out of bounds.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unsupported media type{}: {message}", format_context(.context))]
    UnsupportedMediaType { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Notification failed{}: {source}", format_context(.context))]
    Notify { source: NotifyError, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IntoResponse for GuestError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation { message, .. } => {
                warn!(error = %self, "Rejected guest submission");
                (StatusCode::BAD_REQUEST, message.clone())
            },
            Self::UnsupportedMediaType { message, .. } => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, message.clone())
            },
            Self::Notify { .. } | Self::Internal { .. } => {
                error!(error = %self, "Guest submission could not be delivered");
                (StatusCode::INTERNAL_SERVER_ERROR, Cow::Borrowed(UNAVAILABLE))
            },
        };

        (status, Json(json!({ "status": "error", "message": message }))).into_response()
    }
}
