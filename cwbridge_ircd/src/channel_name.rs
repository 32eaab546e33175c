//! Mapping from backend room names to client protocol channel names.
//!
//! There is no reverse table: to find the room for a channel, apply
//! [`channel_name`] to each known room's name and compare.

/// Channel used for rooms with no display name (direct chats)
pub const DEFAULT_CHANNEL: &str = "mychat";

/// The channel name, without the leading `#`, for a room display name.
///
/// Distinct rooms whose names differ only in spaces versus underscores map to
/// the same channel.
pub fn channel_name(display_name: &str) -> String
{
    if display_name.is_empty() {
        DEFAULT_CHANNEL.to_string()
    } else {
        display_name.replace(' ', "_")
    }
}

/// As [`channel_name`], with the `#` channel marker prepended
pub fn channel_target(display_name: &str) -> String
{
    format!("#{}", channel_name(display_name))
}
