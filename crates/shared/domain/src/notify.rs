//! Value types shared by the notification core and its transports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport-specific conversation address (a Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for ChannelId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Where a single notification goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    /// A registered chat.
    Channel(ChannelId),
    /// An allow-listed username; used only before any chat is registered.
    Username(String),
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(id) => write!(f, "chat {id}"),
            Self::Username(name) => write!(f, "@{name}"),
        }
    }
}

/// The account behind an inbound bot command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    /// Numeric account id.
    pub id: i64,
    /// Display handle, without or with a leading `@`; absent for users without one.
    pub username: Option<String>,
}

impl SenderIdentity {
    #[must_use]
    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }
}

/// Control messages understood by the command router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTrigger {
    /// Register the sender's chat for notifications.
    Register,
    /// Echo the sender's identifiers back.
    IdentityLookup,
}

/// Outcome of an administrator registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationResult {
    NewlyRegistered,
    AlreadyRegistered,
    RejectedNotAdmin,
}

/// Per-recipient delivery result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub recipient: Recipient,
    pub success: bool,
    pub error: Option<String>,
}

impl DispatchOutcome {
    #[must_use]
    pub const fn delivered(recipient: Recipient) -> Self {
        Self { recipient, success: true, error: None }
    }

    #[must_use]
    pub fn failed(recipient: Recipient, error: impl Into<String>) -> Self {
        Self { recipient, success: false, error: Some(error.into()) }
    }
}

/// Aggregate of one fanout run. `errors` keeps recipient order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub errors: Vec<String>,
}

impl DispatchReport {
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.success_count + self.failure_count
    }
}

impl FromIterator<DispatchOutcome> for DispatchReport {
    fn from_iter<I: IntoIterator<Item = DispatchOutcome>>(outcomes: I) -> Self {
        outcomes.into_iter().fold(Self::default(), |mut report, outcome| {
            if outcome.success {
                report.success_count += 1;
            } else {
                report.failure_count += 1;
                let reason = outcome.error.unwrap_or_else(|| "unknown error".to_owned());
                report.errors.push(format!("{}: {reason}", outcome.recipient));
            }
            report
        })
    }
}

/// What a successful submission reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
}

impl From<&DispatchReport> for DispatchSummary {
    fn from(report: &DispatchReport) -> Self {
        Self { delivered: report.success_count, failed: report.failure_count }
    }
}
