//! User-facing texts and menus.

use chrono::FixedOffset;
use postbot_core::{format_local, Action, Button, ButtonLayout};
use storage::{ChannelRecord, ScheduledEntry};

pub const WELCOME: &str = "Hi! I compose posts for your channels and publish them now or later.";
pub const CANCELLED: &str = "Cancelled. Nothing was published.";
pub const CHOOSE_CHANNEL: &str = "Choose the channel to post to:";
pub const NO_CHANNELS: &str = "You have no channels yet. Add one first.";
pub const CHANNEL_NOT_FOUND: &str = "That channel is not registered to you.";
pub const SEND_CONTENT: &str = "Send the post: a text message, or a photo or video with a caption.";
pub const SEND_BUTTONS: &str =
    "Send link buttons, one per line as: Label - https://link\nOr send skip for no buttons.";
pub const BUTTONS_FIRST: &str = "Send your buttons (or skip) before publishing.";
pub const NOTHING_TO_PUBLISH: &str = "There is no post in progress. Use /createpost to start one.";
pub const DRAFT_LOST: &str = "Your draft could not be read. Please start again with /createpost.";
pub const SELECTED_CHANNEL_GONE: &str =
    "The selected channel is no longer registered. Please start again with /createpost.";
pub const PUBLISHED: &str = "✅ Published.";
pub const FORWARD_FROM_CHANNEL: &str =
    "Add me to your channel as an administrator, then forward any post from it here.";
pub const NOT_A_CHANNEL: &str = "That message was not forwarded from a channel. Forward a channel post.";
pub const NOT_ADMIN: &str =
    "I am not an administrator of that channel. Promote me and forward a post again.";
pub const ALREADY_REGISTERED: &str = "That channel is already registered.";
pub const NO_SCHEDULES: &str = "You have no scheduled posts.";
pub const SCHEDULE_DELETED: &str = "Scheduled post deleted.";
pub const SCHEDULE_ALREADY_GONE: &str = "That scheduled post was already published or deleted.";
pub const CHANNEL_REMOVED: &str = "Channel removed.";
pub const CHANNEL_ALREADY_GONE: &str = "That channel was already removed.";

pub fn main_menu() -> ButtonLayout {
    vec![
        vec![Button::action("📝 Create post", Action::CreatePost)],
        vec![Button::action("📢 My channels", Action::ManageChannels)],
        vec![Button::action("⏰ Scheduled posts", Action::ListSchedules)],
    ]
}

pub fn channel_picker(channels: &[ChannelRecord]) -> ButtonLayout {
    channels
        .iter()
        .map(|c| vec![Button::action(c.title.clone(), Action::SelectChannel(c.id))])
        .chain(std::iter::once(vec![Button::action("❌ Cancel", Action::Cancel)]))
        .collect()
}

pub fn add_channel_menu() -> ButtonLayout {
    vec![vec![Button::action("➕ Add channel", Action::AddChannel)]]
}

pub fn channels_view(channels: &[ChannelRecord]) -> (String, ButtonLayout) {
    let text = if channels.is_empty() {
        NO_CHANNELS.to_string()
    } else {
        let lines: Vec<String> = channels
            .iter()
            .map(|c| format!("• {} ({})", c.title, c.telegram_id))
            .collect();
        format!("Your channels:\n{}\n\nTap a channel to remove it.", lines.join("\n"))
    };
    let layout = channels
        .iter()
        .map(|c| {
            vec![Button::action(
                format!("🗑 {}", c.title),
                Action::RemoveChannel(c.id),
            )]
        })
        .chain(add_channel_menu())
        .collect();
    (text, layout)
}

pub fn schedules_view(entries: &[ScheduledEntry], offset: &FixedOffset) -> (String, ButtonLayout) {
    if entries.is_empty() {
        return (NO_SCHEDULES.to_string(), Vec::new());
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|e| format!("#{} → {} at {}", e.id, e.channel_id, format_local(e.post_at, offset)))
        .collect();
    let text = format!(
        "Scheduled posts:\n{}\n\nTap one to delete it.",
        lines.join("\n")
    );
    let layout = entries
        .iter()
        .map(|e| {
            vec![Button::action(
                format!("🗑 #{} {}", e.id, format_local(e.post_at, offset)),
                Action::DeleteSchedule(e.id),
            )]
        })
        .collect();
    (text, layout)
}

pub fn ask_schedule_time(offset_label: &str) -> String {
    format!(
        "When should it be published? Send the time as DD/MM/YYYY HH:MM (UTC{}).",
        offset_label
    )
}

pub fn bad_time_format(offset_label: &str) -> String {
    format!(
        "I could not read that time. Use DD/MM/YYYY HH:MM, e.g. 31/12/2099 10:00 (UTC{}).",
        offset_label
    )
}

pub const TIME_NOT_IN_FUTURE: &str = "That time has already passed. Send a time in the future.";

pub fn scheduled_for(local_time: &str, channel_title: &str) -> String {
    format!("⏰ Scheduled for {} in {}.", local_time, channel_title)
}

pub fn publish_failed(error: &str) -> String {
    format!("❌ Publishing failed: {}", error)
}

pub fn channel_registered(title: &str) -> String {
    format!("✅ Channel \"{}\" registered.", title)
}

pub fn delivered_notice(entry_id: i64, channel_id: i64) -> String {
    format!("✅ Scheduled post #{} was published to {}.", entry_id, channel_id)
}
