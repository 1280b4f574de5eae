//! Adapters from Telegram (teloxide) types to postbot_core types, and from core button layouts back
//! to Telegram inline keyboards.

use chrono::Utc;
use postbot_core::{
    Action, Button, ButtonLayout, Chat, Command, Event, EventKind, ForwardOrigin, PostbotError,
    ToCoreEvent, ToCoreUser, User,
};
use teloxide::types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup, Message,
    MessageOrigin,
};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to a core [`Event`].
pub struct TelegramMessageWrapper<'a>(pub &'a Message);

impl<'a> ToCoreEvent for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Event {
        Event {
            id: self.0.id.to_string(),
            user: self.0.from.as_ref().map(|u| TelegramUserWrapper(u).to_core()),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: format!("{:?}", self.0.chat.kind),
            },
            kind: self.kind(),
            created_at: Utc::now(),
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    /// Forward origin wins over the payload: a forwarded post is a channel reference, not content.
    fn kind(&self) -> EventKind {
        let msg = self.0;
        if let Some(origin) = msg.forward_origin() {
            return EventKind::Forwarded(forward_origin(origin));
        }
        if let Some(text) = msg.text() {
            return match Command::parse(text) {
                Some(command) => EventKind::Command(command),
                None => EventKind::Text(text.to_string()),
            };
        }
        if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
            return EventKind::Photo {
                media_ref: largest.file.id.0.clone(),
                caption: msg.caption().map(str::to_string),
            };
        }
        if let Some(video) = msg.video() {
            return EventKind::Video {
                media_ref: video.file.id.0.clone(),
                caption: msg.caption().map(str::to_string),
            };
        }
        EventKind::Unsupported
    }
}

fn forward_origin(origin: &MessageOrigin) -> ForwardOrigin {
    match origin {
        MessageOrigin::Channel { chat, .. } => ForwardOrigin::Channel {
            chat_id: chat.id.0,
            title: chat.title().unwrap_or_default().to_string(),
        },
        MessageOrigin::User { .. } => ForwardOrigin::Other {
            description: "user".to_string(),
        },
        MessageOrigin::HiddenUser { .. } => ForwardOrigin::Other {
            description: "hidden user".to_string(),
        },
        MessageOrigin::Chat { .. } => ForwardOrigin::Other {
            description: "group".to_string(),
        },
    }
}

/// Wraps a teloxide CallbackQuery (inline button press) for conversion to a core [`Event`].
pub struct TelegramCallbackWrapper<'a>(pub &'a CallbackQuery);

impl<'a> ToCoreEvent for TelegramCallbackWrapper<'a> {
    fn to_core(&self) -> Event {
        let query = self.0;
        let user = TelegramUserWrapper(&query.from).to_core();
        let message = query.regular_message();
        let chat = match message {
            Some(msg) => Chat {
                id: msg.chat.id.0,
                chat_type: format!("{:?}", msg.chat.kind),
            },
            None => Chat {
                id: user.id,
                chat_type: "private".to_string(),
            },
        };

        Event {
            id: query.id.to_string(),
            user: Some(user),
            chat,
            kind: EventKind::Action {
                callback_id: query.id.to_string(),
                action: query.data.as_deref().and_then(Action::parse),
                displayed: message
                    .and_then(|msg| msg.reply_markup())
                    .map(layout_from_markup),
            },
            created_at: Utc::now(),
        }
    }
}

/// Reads the inline keyboard of a message back into a core layout. Button kinds the bot never
/// sends (login, web app, ...) are dropped. URLs are returned in `Url`'s normalized form, so a
/// bare host gains a trailing `/`.
pub fn layout_from_markup(markup: &InlineKeyboardMarkup) -> ButtonLayout {
    markup
        .inline_keyboard
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|button| match &button.kind {
                    InlineKeyboardButtonKind::Url(url) => {
                        Some(Button::url(button.text.clone(), url.as_str()))
                    }
                    InlineKeyboardButtonKind::CallbackData(data) => Some(Button::Callback {
                        label: button.text.clone(),
                        data: data.clone(),
                    }),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

/// Builds a Telegram inline keyboard. A URL Telegram would reject fails the whole layout.
pub fn to_inline_keyboard(layout: &ButtonLayout) -> postbot_core::Result<InlineKeyboardMarkup> {
    let mut rows = Vec::with_capacity(layout.len());
    for row in layout {
        let mut buttons = Vec::with_capacity(row.len());
        for button in row {
            buttons.push(match button {
                Button::Url { label, url } => {
                    let parsed = reqwest::Url::parse(url).map_err(|e| {
                        PostbotError::Bot(format!("Invalid button URL {:?}: {}", url, e))
                    })?;
                    InlineKeyboardButton::url(label.clone(), parsed)
                }
                Button::Callback { label, data } => {
                    InlineKeyboardButton::callback(label.clone(), data.clone())
                }
            });
        }
        rows.push(buttons);
    }
    Ok(InlineKeyboardMarkup::new(rows))
}
