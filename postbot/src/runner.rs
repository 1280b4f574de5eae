//! Entry points behind the CLI subcommands.

use anyhow::Result;
use chrono::Utc;
use postbot_core::{format_local, init_tracing};
use postbot_telegram::run_dispatcher;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::components::{build_bot_components, build_handler_chain, build_publisher, Stores};
use crate::config::BotConfig;

/// Validates config, creates the log directory and installs tracing.
fn prepare(config: &BotConfig) -> Result<()> {
    config.validate()?;
    if let Some(dir) = Path::new(config.log_file()).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    init_tracing(config.log_file())
}

/// Main entry: init logging, build components, start the publisher, then run the dispatcher
/// until Ctrl+C. The publisher is stopped after the dispatcher returns.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    prepare(&config)?;

    info!(
        database_path = %config.database_path(),
        utc_offset = %config.utc_offset(),
        publish_interval_secs = config.publish_interval().as_secs(),
        "Initializing bot"
    );

    let components = build_bot_components(&config).await?;
    let handler_chain = build_handler_chain(
        &components.stores,
        components.messenger.clone(),
        config.utc_offset(),
    );
    let publisher = build_publisher(
        &components.stores,
        components.messenger.clone(),
        config.publish_interval(),
    );

    let cancel = CancellationToken::new();
    let publisher_task = publisher.spawn(cancel.clone());

    info!("Bot started successfully");
    let result = run_dispatcher(components.teloxide_bot.clone(), handler_chain).await;

    cancel.cancel();
    if let Err(e) = publisher_task.await {
        error!(error = %e, "Publisher task ended abnormally");
    }
    info!("Bot stopped");
    result
}

/// One publisher sweep, then exit.
#[instrument(skip(config))]
pub async fn publish_due_once(config: BotConfig) -> Result<()> {
    prepare(&config)?;

    let components = build_bot_components(&config).await?;
    let publisher = build_publisher(
        &components.stores,
        components.messenger.clone(),
        config.publish_interval(),
    );
    let report = publisher.run_once(Utc::now()).await?;

    println!(
        "due: {}, delivered: {}, failed: {}, skipped: {}",
        report.due, report.delivered, report.failed, report.skipped
    );
    Ok(())
}

/// Prints pending scheduled posts, soonest first. Does not need a bot token.
#[instrument(skip(config))]
pub async fn list_due(config: BotConfig) -> Result<()> {
    prepare(&config)?;

    let stores = Stores::open(config.database_path()).await?;
    let entries = stores.schedules.list_pending().await?;
    let offset = config.utc_offset();
    let now = Utc::now();

    if entries.is_empty() {
        println!("No scheduled posts.");
        return Ok(());
    }
    for entry in entries {
        let marker = if entry.post_at <= now { "due" } else { "pending" };
        println!(
            "#{}\t{}\tchannel {}\tby {}\t{}",
            entry.id,
            format_local(entry.post_at, &offset),
            entry.channel_id,
            entry.submitted_by,
            marker
        );
    }
    Ok(())
}
