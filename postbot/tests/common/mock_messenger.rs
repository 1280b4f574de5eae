//! Recording Messenger: stores every outbound call and answers admin checks from a fixed set.

use async_trait::async_trait;
use postbot_core::{ButtonLayout, Messenger, PostbotError, Result};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: i64,
        text: String,
        buttons: Option<ButtonLayout>,
    },
    Photo {
        chat_id: i64,
        media_ref: String,
        caption: String,
        buttons: Option<ButtonLayout>,
    },
    Video {
        chat_id: i64,
        media_ref: String,
        caption: String,
        buttons: Option<ButtonLayout>,
    },
    Answer {
        callback_id: String,
    },
}

impl Sent {
    pub fn chat_id(&self) -> Option<i64> {
        match self {
            Sent::Text { chat_id, .. } | Sent::Photo { chat_id, .. } | Sent::Video { chat_id, .. } => {
                Some(*chat_id)
            }
            Sent::Answer { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } => Some(text),
            Sent::Photo { caption, .. } | Sent::Video { caption, .. } => Some(caption),
            Sent::Answer { .. } => None,
        }
    }

    pub fn buttons(&self) -> Option<&ButtonLayout> {
        match self {
            Sent::Text { buttons, .. } | Sent::Photo { buttons, .. } | Sent::Video { buttons, .. } => {
                buttons.as_ref()
            }
            Sent::Answer { .. } => None,
        }
    }
}

#[derive(Default)]
pub struct MockMessenger {
    sent: Mutex<Vec<Sent>>,
    admin_of: Mutex<HashSet<i64>>,
    failing_chats: Mutex<HashSet<i64>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bot is an administrator of `chat_id` from now on.
    pub fn grant_admin(&self, chat_id: i64) {
        self.admin_of.lock().unwrap().insert(chat_id);
    }

    /// Every send to `chat_id` fails from now on.
    pub fn fail_for(&self, chat_id: i64) {
        self.failing_chats.lock().unwrap().insert(chat_id);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Sends (not acknowledgements) addressed to `chat_id`.
    pub fn sent_to(&self, chat_id: i64) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id() == Some(chat_id))
            .collect()
    }

    pub fn last_to(&self, chat_id: i64) -> Option<Sent> {
        self.sent_to(chat_id).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn record(&self, chat_id: i64, sent: Sent) -> Result<()> {
        if self.failing_chats.lock().unwrap().contains(&chat_id) {
            return Err(PostbotError::Bot(format!("chat {} unavailable", chat_id)));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()> {
        self.record(
            chat_id,
            Sent::Text {
                chat_id,
                text: text.to_string(),
                buttons: buttons.cloned(),
            },
        )
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        media_ref: &str,
        caption: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()> {
        self.record(
            chat_id,
            Sent::Photo {
                chat_id,
                media_ref: media_ref.to_string(),
                caption: caption.to_string(),
                buttons: buttons.cloned(),
            },
        )
    }

    async fn send_video(
        &self,
        chat_id: i64,
        media_ref: &str,
        caption: &str,
        buttons: Option<&ButtonLayout>,
    ) -> Result<()> {
        self.record(
            chat_id,
            Sent::Video {
                chat_id,
                media_ref: media_ref.to_string(),
                caption: caption.to_string(),
                buttons: buttons.cloned(),
            },
        )
    }

    async fn answer_action(&self, callback_id: &str, _text: Option<&str>) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Answer {
            callback_id: callback_id.to_string(),
        });
        Ok(())
    }

    async fn is_admin_in(&self, chat_id: i64) -> Result<bool> {
        Ok(self.admin_of.lock().unwrap().contains(&chat_id))
    }
}
