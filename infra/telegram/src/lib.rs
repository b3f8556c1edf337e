//! # Telegram
//!
//! Bot API adapter for the notifier.
//!
//! * [`TelegramClient`] implements [`rsvp_notify::Messenger`] over `sendMessage`.
//!   Text goes out without `parse_mode`, so guest input is never read as markup.
//! * [`UpdatePoller`] long-polls `getUpdates` and answers `/start` and `/chatid`.

mod client;
mod dto;
mod error;
mod poller;

pub use client::TelegramClient;
pub use dto::{ApiResponse, Chat, ChatTarget, Message, Update, User};
pub use error::{TelegramError, TelegramErrorExt};
pub use poller::{Reply, UpdatePoller, handle_update};
