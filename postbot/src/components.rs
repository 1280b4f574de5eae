//! Component factory: builds stores, the Telegram bot, the handler chain and the publisher from
//! config. Isolates assembly logic from runner.

use anyhow::Result;
use chrono::FixedOffset;
use handler_chain::HandlerChain;
use postbot_core::Messenger;
use postbot_telegram::{TelegramConfig, TelegramMessenger};
use std::sync::Arc;
use std::time::Duration;
use storage::{
    ChannelRegistry, ChannelRepository, ScheduleRepository, ScheduleStore, SqlitePoolManager,
    UserRepository, UserStore,
};
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::conversation::ConversationEngine;
use crate::handlers::{LoggingHandler, UserRegistrationHandler};
use crate::publisher::SchedulePublisher;

/// The three stores over one SQLite pool.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub channels: Arc<dyn ChannelRegistry>,
    pub schedules: Arc<dyn ScheduleStore>,
}

impl Stores {
    /// Opens (creating if missing) the database file and its tables.
    #[instrument]
    pub async fn open(database_path: &str) -> Result<Self> {
        let pool = SqlitePoolManager::new(database_path).await.map_err(|e| {
            error!(error = %e, database_path = %database_path, "Failed to open database");
            anyhow::anyhow!("Failed to open database {}: {}", database_path, e)
        })?;

        let users = UserRepository::new(pool.clone()).await?;
        let channels = ChannelRepository::new(pool.clone()).await?;
        let schedules = ScheduleRepository::new(pool).await?;

        Ok(Self {
            users: Arc::new(users),
            channels: Arc::new(channels),
            schedules: Arc::new(schedules),
        })
    }
}

/// Core dependencies for run_bot / publish-due; produced by the component factory.
pub struct BotComponents {
    pub stores: Stores,
    pub teloxide_bot: teloxide::Bot,
    pub messenger: Arc<dyn Messenger>,
}

/// Opens the stores and builds the Telegram bot and messenger.
#[instrument(skip(config))]
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let stores = Stores::open(config.database_path()).await?;

    let telegram = TelegramConfig::new(
        config.bot_token()?,
        config.telegram_api_url().map(str::to_string),
    );
    let teloxide_bot = telegram.build_bot()?;
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(teloxide_bot.clone()));

    info!(database_path = %config.database_path(), "Bot components ready");

    Ok(BotComponents {
        stores,
        teloxide_bot,
        messenger,
    })
}

/// Builds the handler chain (logging → user registration → conversation engine).
pub fn build_handler_chain(
    stores: &Stores,
    messenger: Arc<dyn Messenger>,
    offset: FixedOffset,
) -> HandlerChain {
    let engine = ConversationEngine::new(
        stores.users.clone(),
        stores.channels.clone(),
        stores.schedules.clone(),
        messenger,
        offset,
    );
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(UserRegistrationHandler::new(stores.users.clone())))
        .add_handler(Arc::new(engine))
}

pub fn build_publisher(
    stores: &Stores,
    messenger: Arc<dyn Messenger>,
    period: Duration,
) -> Arc<SchedulePublisher> {
    Arc::new(SchedulePublisher::new(
        stores.schedules.clone(),
        messenger,
        period,
    ))
}
