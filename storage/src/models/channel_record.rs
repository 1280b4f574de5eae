//! Registered destination channel.
//!
//! Maps to the `channels` table; `telegram_id` is unique across all owners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChannelRecord {
    pub id: i64,
    /// External chat id of the channel.
    pub telegram_id: i64,
    pub title: String,
    /// Telegram id of the user who registered the channel.
    pub added_by_id: i64,
    pub created_at: DateTime<Utc>,
}
