use crate::dto::{ContactRequest, ContactResponse};
use crate::error::{GuestError, GuestErrorExt};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use rsvp_derive::api_handler;
use rsvp_domain::constants::GUEST_TAG;
use rsvp_kernel::server::ApiState;
use rsvp_notify::Notifier;
use tracing::info;

#[api_handler(
    post,
    path = "/",
    request_body = ContactRequest,
    responses(
        (status = CREATED, description = "Forwarded to the organizers", body = ContactResponse),
        (status = BAD_REQUEST, description = "Malformed body or invalid field"),
        (status = UNSUPPORTED_MEDIA_TYPE, description = "Body is not application/json"),
        (status = INTERNAL_SERVER_ERROR, description = "Notification service unavailable"),
    ),
    tag = GUEST_TAG,
)]
pub(crate) async fn submit_contact(
    State(state): State<ApiState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactResponse>), GuestError> {
    let Json(request) = payload.map_err(rejection)?;
    let submission = request.validate()?;

    let notifier = state
        .try_get_slice::<Notifier>()
        .map_err(|err| GuestError::from(err.to_string()))?
        .clone();

    let summary = notifier.submit(&submission).await.context("Submitting guest reply")?;
    info!(delivered = summary.delivered, failed = summary.failed, "Guest reply forwarded");

    Ok((StatusCode::CREATED, Json(ContactResponse::success())))
}

fn rejection(err: JsonRejection) -> GuestError {
    match err {
        JsonRejection::MissingJsonContentType(_) => GuestError::UnsupportedMediaType {
            message: "expected application/json".into(),
            context: None,
        },
        other => GuestError::Validation { message: other.body_text().into(), context: None },
    }
}
