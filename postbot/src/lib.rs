//! # postbot
//!
//! Telegram bot that composes posts for registered channels and publishes them immediately or at a
//! scheduled time. Wires storage, the handler chain, the conversation engine and the schedule
//! publisher; loads config from env.

pub mod cli;
pub mod components;
pub mod config;
pub mod conversation;
pub mod handlers;
pub mod publisher;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, build_publisher, BotComponents, Stores};
pub use config::BotConfig;
pub use conversation::{ConversationEngine, UserLocks};
pub use handlers::{LoggingHandler, UserRegistrationHandler};
pub use publisher::{PublishReport, SchedulePublisher};
pub use runner::{list_due, publish_due_once, run_bot};
