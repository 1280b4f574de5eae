//! BotConfig: BaseConfig + ScheduleConfig. Use load() for env-based loading.

use anyhow::Result;
use chrono::FixedOffset;
use std::time::Duration;

use super::{BaseConfig, ScheduleConfig};

pub struct BotConfig {
    base: BaseConfig,
    schedule: ScheduleConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let schedule = ScheduleConfig::from_env()?;
        Ok(Self { base, schedule })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.schedule.validate()
    }

    /// The bot token, or an error for commands that need Telegram.
    pub fn bot_token(&self) -> Result<&str> {
        self.base
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("BOT_TOKEN not set (pass --token or set BOT_TOKEN)"))
    }
    pub fn database_path(&self) -> &str {
        self.base.database_path()
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
    pub fn utc_offset(&self) -> FixedOffset {
        self.schedule.utc_offset
    }
    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.publish_interval_secs)
    }
}
