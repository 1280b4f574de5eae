//! User row: identity plus the conversation state, draft and selected channel.
//!
//! Maps to the `users` table and is used by UserRepository.

use chrono::{DateTime, Utc};
use postbot_core::{ConversationState, Draft, DraftError};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub state: String,
    /// Encoded [`Draft`]; empty when there is none.
    pub draft: String,
    /// Row id of the channel chosen for the current post.
    pub selected_channel_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn state(&self) -> Result<ConversationState, StorageError> {
        self.state.parse().map_err(StorageError::Corrupt)
    }

    pub fn draft(&self) -> Result<Option<Draft>, DraftError> {
        Draft::decode_stored(&self.draft)
    }
}

/// New values for the mutable part of a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub state: ConversationState,
    pub draft: String,
    pub selected_channel_id: Option<i64>,
}

impl UserUpdate {
    pub fn new(state: ConversationState, draft: String, selected_channel_id: Option<i64>) -> Self {
        Self {
            state,
            draft,
            selected_channel_id,
        }
    }

    /// IDLE with draft and channel cleared: the state at every terminal point of a flow.
    pub fn idle() -> Self {
        Self::new(ConversationState::Idle, String::new(), None)
    }
}
