//! # postbot-core
//!
//! Core types and traits for the post scheduling bot: inbound [`Event`]s, [`Draft`] content,
//! per-user [`ConversationState`], button layouts, the [`Messenger`] and [`Handler`] traits,
//! and tracing initialization. Transport-agnostic; used by storage, handler-chain,
//! postbot-telegram and the postbot application.

pub mod action;
pub mod buttons;
pub mod draft;
pub mod error;
pub mod keyboard;
pub mod logger;
pub mod messenger;
pub mod schedule_time;
pub mod state;
pub mod types;

pub use action::Action;
pub use buttons::parse_button_lines;
pub use draft::{Draft, DraftContent, DraftError, DraftKind, UrlButton, DRAFT_SCHEMA_VERSION};
pub use error::{HandlerError, PostbotError, Result};
pub use keyboard::{preview_layout, strip_control_rows, url_layout, Button, ButtonLayout, CONTROL_ROWS};
pub use logger::init_tracing;
pub use messenger::{send_draft, Messenger};
pub use schedule_time::{
    format_local, parse_schedule_time, parse_utc_offset, TimeParseError, SCHEDULE_TIME_FORMAT,
};
pub use state::ConversationState;
pub use types::{
    Chat, Command, Event, EventKind, ForwardOrigin, Handler, HandlerResponse, ToCoreEvent,
    ToCoreUser, User,
};
