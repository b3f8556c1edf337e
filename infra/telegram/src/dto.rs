//! Subset of the Bot API wire types this service reads or writes.

use rsvp_domain::constants::strip_marker;
use rsvp_domain::notify::{ChannelId, Recipient, SenderIdentity};
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

impl From<&User> for SenderIdentity {
    fn from(user: &User) -> Self {
        Self { id: user.id, username: user.username.clone() }
    }
}

/// `chat_id` accepts a numeric id or `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

impl From<&Recipient> for ChatTarget {
    fn from(recipient: &Recipient) -> Self {
        match recipient {
            Recipient::Channel(ChannelId(id)) => Self::Id(*id),
            Recipient::Username(name) => Self::Username(format!("@{}", strip_marker(name))),
        }
    }
}

/// `sendMessage` body. No `parse_mode`: text is delivered verbatim.
#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: ChatTarget,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: [&'static str; 1],
}
