//! Interactive button actions and their callback-data tokens.
//!
//! Tokens are plain strings (Telegram limits callback data to 64 bytes); id-carrying actions use a
//! fixed prefix followed by the numeric id, e.g. `select_channel_12`.

const CREATE_POST: &str = "create_post";
const MANAGE_CHANNELS: &str = "manage_channels";
const ADD_CHANNEL: &str = "add_channel";
const LIST_SCHEDULES: &str = "list_schedules";
const PUBLISH_NOW: &str = "publish_now";
const SCHEDULE: &str = "schedule";
const CANCEL: &str = "cancel";

const SELECT_CHANNEL_PREFIX: &str = "select_channel_";
const REMOVE_CHANNEL_PREFIX: &str = "remove_channel_";
const DELETE_SCHEDULE_PREFIX: &str = "delete_schedule_";

/// A button press the conversation engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePost,
    ManageChannels,
    AddChannel,
    ListSchedules,
    /// Row id of a registered channel.
    SelectChannel(i64),
    /// Row id of a registered channel.
    RemoveChannel(i64),
    /// Row id of a scheduled entry.
    DeleteSchedule(i64),
    PublishNow,
    Schedule,
    Cancel,
}

impl Action {
    /// Parses a callback-data token. Returns `None` for anything unrecognised.
    pub fn parse(data: &str) -> Option<Self> {
        let data = data.trim();
        if let Some(id) = data.strip_prefix(SELECT_CHANNEL_PREFIX) {
            return id.parse().ok().map(Action::SelectChannel);
        }
        if let Some(id) = data.strip_prefix(REMOVE_CHANNEL_PREFIX) {
            return id.parse().ok().map(Action::RemoveChannel);
        }
        if let Some(id) = data.strip_prefix(DELETE_SCHEDULE_PREFIX) {
            return id.parse().ok().map(Action::DeleteSchedule);
        }
        match data {
            CREATE_POST => Some(Action::CreatePost),
            MANAGE_CHANNELS => Some(Action::ManageChannels),
            ADD_CHANNEL => Some(Action::AddChannel),
            LIST_SCHEDULES => Some(Action::ListSchedules),
            PUBLISH_NOW => Some(Action::PublishNow),
            SCHEDULE => Some(Action::Schedule),
            CANCEL => Some(Action::Cancel),
            _ => None,
        }
    }

    /// Callback-data token for this action.
    pub fn to_data(&self) -> String {
        match self {
            Action::CreatePost => CREATE_POST.to_string(),
            Action::ManageChannels => MANAGE_CHANNELS.to_string(),
            Action::AddChannel => ADD_CHANNEL.to_string(),
            Action::ListSchedules => LIST_SCHEDULES.to_string(),
            Action::SelectChannel(id) => format!("{}{}", SELECT_CHANNEL_PREFIX, id),
            Action::RemoveChannel(id) => format!("{}{}", REMOVE_CHANNEL_PREFIX, id),
            Action::DeleteSchedule(id) => format!("{}{}", DELETE_SCHEDULE_PREFIX, id),
            Action::PublishNow => PUBLISH_NOW.to_string(),
            Action::Schedule => SCHEDULE.to_string(),
            Action::Cancel => CANCEL.to_string(),
        }
    }
}
