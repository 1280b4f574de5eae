//! # postbot-telegram
//!
//! Telegram transport layer: adapters from teloxide updates to core events, a [`postbot_core::Messenger`]
//! implementation, minimal config, and the dispatcher runner.
//! Handles only Telegram connectivity and handler-chain execution; no persistence or conversation logic.

mod adapters;
mod config;
mod messenger;
mod runner;

pub use adapters::{
    layout_from_markup, to_inline_keyboard, TelegramCallbackWrapper, TelegramMessageWrapper,
    TelegramUserWrapper,
};
pub use config::TelegramConfig;
pub use messenger::TelegramMessenger;
pub use runner::run_dispatcher;
