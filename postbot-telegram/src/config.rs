//! Transport config: bot token and optional Bot API server URL.

use anyhow::Result;

/// Telegram connectivity only; application settings live in the postbot crate.
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, telegram_api_url: Option<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            telegram_api_url,
        }
    }

    /// Builds the teloxide Bot, pointing it at a custom Bot API server when configured.
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = teloxide::Bot::new(self.bot_token.clone());
        match &self.telegram_api_url {
            Some(url) => {
                let parsed = reqwest::Url::parse(url)
                    .map_err(|e| anyhow::anyhow!("Invalid Telegram API URL {}: {}", url, e))?;
                Ok(bot.set_api_url(parsed))
            }
            None => Ok(bot),
        }
    }
}
