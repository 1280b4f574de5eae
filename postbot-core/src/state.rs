//! Per-user conversation state. Governs how the next inbound event from that user is read.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    WaitingContent,
    WaitingButtons,
    WaitingScheduleTime,
    WaitingForward,
}

impl ConversationState {
    /// Value stored in the `state` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Idle => "IDLE",
            ConversationState::WaitingContent => "WAITING_CONTENT",
            ConversationState::WaitingButtons => "WAITING_BUTTONS",
            ConversationState::WaitingScheduleTime => "WAITING_SCHEDULE_TIME",
            ConversationState::WaitingForward => "WAITING_FORWARD",
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(ConversationState::Idle),
            "WAITING_CONTENT" => Ok(ConversationState::WaitingContent),
            "WAITING_BUTTONS" => Ok(ConversationState::WaitingButtons),
            "WAITING_SCHEDULE_TIME" => Ok(ConversationState::WaitingScheduleTime),
            "WAITING_FORWARD" => Ok(ConversationState::WaitingForward),
            other => Err(format!("unknown conversation state: {}", other)),
        }
    }
}
