//! Bot configuration: BaseConfig (Telegram + log + DB) + ScheduleConfig (time zone, publish cadence).

mod base;
mod bot_config;
mod schedule;


pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use schedule::ScheduleConfig;
