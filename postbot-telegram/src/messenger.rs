//! Wraps teloxide::Bot and implements [`postbot_core::Messenger`]. Production code sends through
//! Telegram; tests substitute a recording mock.

use async_trait::async_trait;
use postbot_core::{ButtonLayout, Messenger, PostbotError, Result};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ChatId, FileId, InputFile, UserId};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::adapters::to_inline_keyboard;

fn bot_error(e: teloxide::RequestError) -> PostbotError {
    PostbotError::Bot(e.to_string())
}

/// Thin wrapper around teloxide::Bot that implements the core Messenger trait.
pub struct TelegramMessenger {
    bot: teloxide::Bot,
    me: OnceCell<UserId>,
}

impl TelegramMessenger {
    /// Creates a messenger from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self {
            bot,
            me: OnceCell::new(),
        }
    }

    /// The bot's own user id, fetched once via getMe.
    async fn bot_user_id(&self) -> Result<UserId> {
        let id = self
            .me
            .get_or_try_init(|| async {
                let me = self.bot.get_me().await.map_err(bot_error)?;
                Ok::<_, PostbotError>(me.user.id)
            })
            .await?;
        Ok(*id)
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), text.to_string());
        if let Some(layout) = buttons {
            request = request.reply_markup(to_inline_keyboard(layout)?);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        media_ref: &str,
        caption: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()> {
        let file = InputFile::file_id(FileId(media_ref.to_string()));
        let mut request = self
            .bot
            .send_photo(ChatId(chat_id), file)
            .caption(caption.to_string());
        if let Some(layout) = buttons {
            request = request.reply_markup(to_inline_keyboard(layout)?);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn send_video(
        &self,
        chat_id: i64,
        media_ref: &str,
        caption: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()> {
        let file = InputFile::file_id(FileId(media_ref.to_string()));
        let mut request = self
            .bot
            .send_video(ChatId(chat_id), file)
            .caption(caption.to_string());
        if let Some(layout) = buttons {
            request = request.reply_markup(to_inline_keyboard(layout)?);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn answer_action(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        if let Some(text) = text {
            request = request.text(text.to_string());
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn is_admin_in(&self, chat_id: i64) -> Result<bool> {
        let me = self.bot_user_id().await?;
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), me)
            .await
            .map_err(bot_error)?;
        debug!(chat_id, kind = ?member.kind, "Bot membership checked");
        Ok(member.is_privileged())
    }
}
