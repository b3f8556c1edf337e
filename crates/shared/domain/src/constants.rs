//! Shared string constants (`OpenAPI` tags, header values, well-known commands).

pub const SYSTEM_TAG: &str = "System";
pub const GUEST_TAG: &str = "Guests";

/// Bot command that registers an administrator's chat.
pub const START_COMMAND: &str = "start";
/// Bot command that echoes the caller's identifiers.
pub const CHAT_ID_COMMAND: &str = "chatid";

/// Marker character stripped from usernames before comparison.
pub const USERNAME_MARKER: char = '@';

/// `name` with at most one leading [`USERNAME_MARKER`] removed.
#[must_use]
pub fn strip_marker(name: &str) -> &str {
    name.strip_prefix(USERNAME_MARKER).unwrap_or(name)
}
