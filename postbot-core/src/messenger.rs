//! Messenger abstraction for outbound messages and interactive acknowledgements.
//!
//! [`Messenger`] is transport-agnostic; postbot-telegram implements it via teloxide and tests
//! substitute a recording mock.

use async_trait::async_trait;

use crate::draft::{Draft, DraftContent};
use crate::error::Result;
use crate::keyboard::ButtonLayout;

/// Outbound side of the bot. All calls may fail (network, permissions, stale chat).
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a text message to `chat_id`, optionally with inline buttons.
    async fn send_text(&self, chat_id: i64, text: &str, buttons: Option<&ButtonLayout>)
        -> Result<()>;
    /// Sends a previously uploaded photo with a caption.
    async fn send_photo(
        &self,
        chat_id: i64,
        media_ref: &str,
        caption: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()>;
    /// Sends a previously uploaded video with a caption.
    async fn send_video(
        &self,
        chat_id: i64,
        media_ref: &str,
        caption: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()>;
    /// Acknowledges a button press, optionally with a short toast text.
    async fn answer_action(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
    /// Whether the bot itself is an administrator of `chat_id`.
    async fn is_admin_in(&self, chat_id: i64) -> Result<bool>;
}

/// Sends `draft` to `chat_id` with the method matching its kind.
pub async fn send_draft(
    messenger: &dyn Messenger,
    chat_id: i64,
    draft: &Draft,
    buttons: Option<&ButtonLayout>,
) -> Result<()> {
    let buttons = buttons.filter(|layout| !layout.is_empty());
    match &draft.body {
        DraftContent::Text { content } => messenger.send_text(chat_id, content, buttons).await,
        DraftContent::Photo { content, media_ref } => {
            messenger.send_photo(chat_id, media_ref, content, buttons).await
        }
        DraftContent::Video { content, media_ref } => {
            messenger.send_video(chat_id, media_ref, content, buttons).await
        }
    }
}
