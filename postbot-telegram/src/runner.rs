//! Dispatcher runner: converts teloxide messages and callback queries to core events and passes
//! them to the HandlerChain.
//!
//! Events are handled inline rather than spawned: the dispatcher already runs different chats
//! concurrently and one chat's updates in arrival order, which the conversation state relies on.

use anyhow::Result;
use handler_chain::HandlerChain;
use postbot_core::{Event, ToCoreEvent};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message};
use tracing::{error, info, instrument};

use crate::adapters::{TelegramCallbackWrapper, TelegramMessageWrapper};

/// Runs long polling until Ctrl+C. Every message and callback query goes through `handler_chain`.
#[instrument(skip(bot, handler_chain))]
pub async fn run_dispatcher(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!(username = ?me.user.username, "Bot identity resolved");
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_chain])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
    Ok(())
}

async fn on_message(msg: Message, chain: HandlerChain) -> ResponseResult<()> {
    let event = TelegramMessageWrapper(&msg).to_core();
    run_chain(&chain, &event).await;
    Ok(())
}

async fn on_callback(query: CallbackQuery, chain: HandlerChain) -> ResponseResult<()> {
    let event = TelegramCallbackWrapper(&query).to_core();
    run_chain(&chain, &event).await;
    Ok(())
}

async fn run_chain(chain: &HandlerChain, event: &Event) {
    let user_id = event.user.as_ref().map(|u| u.id);
    info!(
        user_id = ?user_id,
        chat_id = event.chat.id,
        kind = event.kind.name(),
        "Received update"
    );
    if let Err(e) = chain.handle(event).await {
        error!(error = %e, user_id = ?user_id, "Handler chain failed");
    }
}
