//! Core types: user, chat, inbound event, handler response, and the Handler trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::keyboard::ButtonLayout;

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Chat (channel or private) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// Slash commands typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    CreatePost,
    Channels,
    Schedules,
    Cancel,
}

impl Command {
    /// Parses `/name` or `/name@botname` (arguments are ignored). Returns `None` for other text.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.trim().split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "createpost" => Some(Command::CreatePost),
            "channels" => Some(Command::Channels),
            "schedules" => Some(Command::Schedules),
            "cancel" => Some(Command::Cancel),
            _ => None,
        }
    }
}

/// Where a forwarded message originally came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOrigin {
    Channel { chat_id: i64, title: String },
    /// User, hidden user, or group; `description` is for logs.
    Other { description: String },
}

#[derive(Debug, Clone)]
pub enum EventKind {
    Command(Command),
    Text(String),
    Photo {
        media_ref: String,
        caption: Option<String>,
    },
    Video {
        media_ref: String,
        caption: Option<String>,
    },
    Forwarded(ForwardOrigin),
    /// Inline button press. `displayed` is the layout of the message the button sits on.
    Action {
        callback_id: String,
        action: Option<Action>,
        displayed: Option<ButtonLayout>,
    },
    /// Anything the bot does not interpret (stickers, documents, ...).
    Unsupported,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Command(_) => "command",
            EventKind::Text(_) => "text",
            EventKind::Photo { .. } => "photo",
            EventKind::Video { .. } => "video",
            EventKind::Forwarded(_) => "forwarded",
            EventKind::Action { .. } => "action",
            EventKind::Unsupported => "unsupported",
        }
    }
}

/// A single inbound event: sender (absent for anonymous/system updates), chat, and payload.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: String,
    pub user: Option<User>,
    pub chat: Chat,
    pub kind: EventKind,
    pub created_at: DateTime<Utc>,
}

/// Handler result for the chain. `Reply(text)` carries the response body so later handlers can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Skip this handler, try next.
    Ignore,
    /// Stop the chain and attach reply text.
    Reply(String),
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific update to a core [`Event`].
pub trait ToCoreEvent: Send + Sync {
    fn to_core(&self) -> Event;
}

/// Single handler concept: optional before / handle / after. Chain runs all before → handle until Stop/Reply → all after (reverse).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _event: &Event) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the event. Return Stop or Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _event: &Event) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _event: &Event,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
