//! Guest contact slice: the `POST /` endpoint the invitation page submits to.
//!
//! The handler validates the body, hands the submission to the
//! [`Notifier`](rsvp_notify::Notifier) registered in [`ApiState`] and maps
//! the outcome to an HTTP status.

mod dto;
mod error;
mod handler;

pub use dto::{ContactRequest, ContactResponse};
pub use error::{GuestError, GuestErrorExt};

use rsvp_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Routes of the guest slice.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handler::submit_contact))
}
