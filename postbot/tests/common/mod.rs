//! Shared helpers for postbot integration tests: isolated stores, a mock messenger, event builders.

#![allow(dead_code)]

pub mod mock_messenger;

use chrono::{FixedOffset, Utc};
use handler_chain::HandlerChain;
use postbot::{build_handler_chain, Stores};
use postbot_core::{
    Action, ButtonLayout, Chat, Command, ConversationState, Event, EventKind, ForwardOrigin,
    HandlerResponse, User,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub use mock_messenger::{MockMessenger, Sent};

pub const USER_ID: i64 = 1001;

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

pub fn bangkok() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

/// Stores over a fresh SQLite file, a mock messenger and the production handler chain.
/// Keep the struct alive for the duration of the test (it owns the TempDir).
pub struct TestEnv {
    _dir: TempDir,
    pub stores: Stores,
    pub messenger: Arc<MockMessenger>,
    pub chain: HandlerChain,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("postbot.db");
        let stores = Stores::open(&path.to_string_lossy())
            .await
            .expect("Failed to open stores");
        let messenger = Arc::new(MockMessenger::new());
        let chain = build_handler_chain(&stores, messenger.clone(), bangkok());
        Self {
            _dir: dir,
            stores,
            messenger,
            chain,
        }
    }

    pub async fn send(&self, event: Event) -> HandlerResponse {
        self.chain.handle(&event).await.expect("handler chain failed")
    }

    pub async fn state_of(&self, user_id: i64) -> ConversationState {
        self.stores
            .users
            .find(user_id)
            .await
            .unwrap()
            .expect("user exists")
            .state()
            .unwrap()
    }

    /// Registers a channel owned by `owner` and returns its row id.
    pub async fn add_channel(&self, telegram_id: i64, title: &str, owner: i64) -> i64 {
        self.stores
            .channels
            .create(telegram_id, title, owner)
            .await
            .unwrap()
            .id
    }
}

fn event(user_id: Option<i64>, kind: EventKind) -> Event {
    let chat_id = user_id.unwrap_or(-1);
    Event {
        id: NEXT_EVENT_ID.fetch_add(1, Ordering::SeqCst).to_string(),
        user: user_id.map(|id| User {
            id,
            username: Some(format!("user{}", id)),
            first_name: Some("Test".to_string()),
            last_name: None,
        }),
        chat: Chat {
            id: chat_id,
            chat_type: "private".to_string(),
        },
        kind,
        created_at: Utc::now(),
    }
}

pub fn text(user_id: i64, text: &str) -> Event {
    event(Some(user_id), EventKind::Text(text.to_string()))
}

pub fn command(user_id: i64, command: Command) -> Event {
    event(Some(user_id), EventKind::Command(command))
}

pub fn photo(user_id: i64, media_ref: &str, caption: Option<&str>) -> Event {
    event(
        Some(user_id),
        EventKind::Photo {
            media_ref: media_ref.to_string(),
            caption: caption.map(str::to_string),
        },
    )
}

pub fn video(user_id: i64, media_ref: &str, caption: Option<&str>) -> Event {
    event(
        Some(user_id),
        EventKind::Video {
            media_ref: media_ref.to_string(),
            caption: caption.map(str::to_string),
        },
    )
}

pub fn forwarded(user_id: i64, origin: ForwardOrigin) -> Event {
    event(Some(user_id), EventKind::Forwarded(origin))
}

pub fn action(user_id: i64, action: Action) -> Event {
    action_on(user_id, action, None)
}

/// Button press on a message currently showing `displayed`.
pub fn action_on(user_id: i64, action: Action, displayed: Option<ButtonLayout>) -> Event {
    event(
        Some(user_id),
        EventKind::Action {
            callback_id: format!("cb-{}", NEXT_EVENT_ID.load(Ordering::SeqCst)),
            action: Some(action),
            displayed,
        },
    )
}

pub fn anonymous_text(text: &str) -> Event {
    event(None, EventKind::Text(text.to_string()))
}
