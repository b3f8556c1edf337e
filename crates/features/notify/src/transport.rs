//! Outbound messaging port.

use rsvp_domain::notify::Recipient;
use std::borrow::Cow;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

/// Failure of a single recipient send. Recorded per recipient, never escalated alone.
#[rsvp_derive::rsvp_error]
#[derive(Clone)]
pub enum TransportError {
    /// The remote side answered and refused the message (blocked bot, unknown chat, ...).
    #[error("Delivery rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The request never got a usable answer.
    #[error("Network error{}: {message}", format_context(.context))]
    Network { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The send exceeded its time budget.
    #[error("Delivery timed out after {millis} ms{}", format_context(.context))]
    Timeout { millis: u128, context: Option<Cow<'static, str>> },
}

/// Boxed send future so the port stays object-safe.
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Capability to deliver plain text to a recipient.
///
/// The core only interprets success versus failure; retries, markup and rate
/// limits belong to the implementation.
pub trait Messenger: Debug + Send + Sync + 'static {
    fn send<'a>(&'a self, recipient: &'a Recipient, text: &'a str) -> SendFuture<'a>;
}
