//! Base config: Telegram Bot connection, logging, database. Loaded from env.

use anyhow::Result;
use std::env;

/// Base config: Telegram-related, logging, database only.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN; only commands that talk to Telegram require it.
    pub bot_token: Option<String>,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// Log file path
    pub log_file: String,
    /// SQLite database file (a `sqlite:` or `file:` prefix is accepted)
    pub database_url: String,
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = token.or_else(|| env::var("BOT_TOKEN").ok());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "./postbot.db".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/postbot.log".to_string());
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            database_url,
        })
    }

    /// Validate config (e.g. telegram_api_url must be valid URL if set).
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if self.database_path().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        Ok(())
    }

    /// Database file path with any `sqlite://`, `sqlite:` or `file:` prefix removed.
    pub fn database_path(&self) -> &str {
        let url = self.database_url.as_str();
        ["sqlite://", "sqlite:", "file:"]
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix))
            .unwrap_or(url)
    }
}
