//! Scheduled post awaiting dispatch.
//!
//! Maps to the `scheduled_posts` table. `post_at` and `created_at` are stored as unix seconds so
//! the due-time comparison is numeric.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    pub id: i64,
    /// External chat id of the destination (a copy, not a reference to a channel row).
    pub channel_id: i64,
    /// Encoded draft including its finalized buttons.
    pub data: String,
    pub post_at: DateTime<Utc>,
    pub submitted_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Values for a new scheduled entry; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewScheduledEntry {
    pub channel_id: i64,
    pub data: String,
    pub post_at: DateTime<Utc>,
    pub submitted_by: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ScheduledEntryRow {
    pub id: i64,
    pub channel_id: i64,
    pub data: String,
    pub post_at: i64,
    pub submitted_by: i64,
    pub created_at: i64,
}

impl TryFrom<ScheduledEntryRow> for ScheduledEntry {
    type Error = StorageError;

    fn try_from(row: ScheduledEntryRow) -> Result<Self, Self::Error> {
        let post_at = DateTime::from_timestamp(row.post_at, 0).ok_or_else(|| {
            StorageError::Corrupt(format!("scheduled post {} has invalid post_at", row.id))
        })?;
        let created_at = DateTime::from_timestamp(row.created_at, 0).ok_or_else(|| {
            StorageError::Corrupt(format!("scheduled post {} has invalid created_at", row.id))
        })?;
        Ok(Self {
            id: row.id,
            channel_id: row.channel_id,
            data: row.data,
            post_at,
            submitted_by: row.submitted_by,
            created_at,
        })
    }
}
