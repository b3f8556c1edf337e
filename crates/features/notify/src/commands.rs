//! Stateless bot command handling.

use crate::registry::AdminRegistry;
use rsvp_domain::constants::{CHAT_ID_COMMAND, START_COMMAND, strip_marker};
use rsvp_domain::notify::{ChannelId, CommandTrigger, RegistrationResult, SenderIdentity};

const GREETING: &str = "👋 Hello! I am the guest notification bot for this event.\n\
                        Guests reply through the invitation page; there is nothing to do here.";

/// Recognizes `/start` and `/chatid` in raw message text.
///
/// Accepts the `/cmd@botname` form and ignores trailing arguments. Anything
/// else, including plain text, yields `None`.
#[must_use]
pub fn parse_command(text: &str) -> Option<CommandTrigger> {
    let head = text.trim_start().split_whitespace().next()?;
    let command = head.strip_prefix('/')?;
    let command = command.split_once('@').map_or(command, |(name, _bot)| name);

    if command.eq_ignore_ascii_case(START_COMMAND) {
        Some(CommandTrigger::Register)
    } else if command.eq_ignore_ascii_case(CHAT_ID_COMMAND) {
        Some(CommandTrigger::IdentityLookup)
    } else {
        None
    }
}

/// Maps command triggers onto registry operations and renders the reply.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    registry: AdminRegistry,
}

impl CommandRouter {
    #[must_use]
    pub const fn new(registry: AdminRegistry) -> Self {
        Self { registry }
    }

    /// Handles one command and returns the text to send back to `channel`.
    #[must_use]
    pub fn on_command(
        &self,
        trigger: CommandTrigger,
        sender: &SenderIdentity,
        channel: ChannelId,
    ) -> String {
        match trigger {
            CommandTrigger::Register => self.register(sender, channel),
            CommandTrigger::IdentityLookup => identity_lookup(sender, channel),
        }
    }

    fn register(&self, sender: &SenderIdentity, channel: ChannelId) -> String {
        let handle = strip_marker(sender.handle());
        match self.registry.register(sender.handle(), channel) {
            RegistrationResult::NewlyRegistered => format!(
                "👋 Hello, administrator @{handle}!\n\
                 ✅ Your chat ID ({channel}) is registered.\n\
                 You will now receive notifications about new guests."
            ),
            RegistrationResult::AlreadyRegistered => format!(
                "👋 Hello, administrator @{handle}!\n\
                 ✅ You are already registered for notifications."
            ),
            RegistrationResult::RejectedNotAdmin => GREETING.to_owned(),
        }
    }
}

fn identity_lookup(sender: &SenderIdentity, channel: ChannelId) -> String {
    let username = match strip_marker(sender.handle()) {
        "" => "(none)".to_owned(),
        name => format!("@{name}"),
    };
    format!(
        "📋 Your IDs:\n\
         💬 Chat ID: {channel}\n\
         👤 User ID: {id}\n\
         🔹 Username: {username}",
        id = sender.id,
    )
}
