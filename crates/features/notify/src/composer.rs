//! Fixed notification template for guest submissions.
//!
//! Guest-supplied text is inserted verbatim. Transports must deliver it as
//! plain text so nothing in it is interpreted as markup.

use chrono::{Local, NaiveDateTime};
use rsvp_domain::guest::GuestSubmission;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SHUTTLE_BLOCK: &str = "🚌 Shuttle transfer";

/// Renders `submission` stamped with the current local time.
#[must_use]
pub fn compose(submission: &GuestSubmission) -> String {
    compose_at(submission, Local::now().naive_local())
}

/// Renders `submission` stamped with `at`.
#[must_use]
pub fn compose_at(submission: &GuestSubmission, at: NaiveDateTime) -> String {
    let transport = submission.vehicle_plate().map_or_else(
        || SHUTTLE_BLOCK.to_owned(),
        |plate| format!("🚗 Personal vehicle\n🚙 License plate: {plate}"),
    );

    format!(
        "📨 New guest:\n\
         👤 Name: {name}\n\
         📞 Phone: {phone}\n\
         📍 Transport: {transport}\n\
         📅 Time: {time}",
        name = submission.full_name,
        phone = submission.phone,
        time = at.format(TIMESTAMP_FORMAT),
    )
}
