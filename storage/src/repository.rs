//! Store traits consumed by the conversation engine and the publisher.
//!
//! SQLite implementations live in this crate; the traits keep callers independent of the engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postbot_core::ConversationState;

use crate::error::StorageError;
use crate::models::{ChannelRecord, NewScheduledEntry, ScheduledEntry, UserRecord, UserUpdate};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the user row, creating it in IDLE on first contact. Refreshes the username.
    async fn get_or_create(
        &self,
        telegram_id: i64,
        username: Option<&str>,
    ) -> Result<UserRecord, StorageError>;

    async fn find(&self, telegram_id: i64) -> Result<Option<UserRecord>, StorageError>;

    /// Writes `update` only if the stored state still equals `expected`.
    ///
    /// Returns [`StorageError::StateConflict`] when another writer moved the state first, and
    /// [`StorageError::NotFound`] when the user does not exist.
    async fn transition(
        &self,
        telegram_id: i64,
        expected: ConversationState,
        update: &UserUpdate,
    ) -> Result<(), StorageError>;

    /// Unconditionally resets the user to IDLE with no draft and no selected channel.
    async fn reset(&self, telegram_id: i64) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ChannelRecord>, StorageError>;

    async fn find_by_external_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<ChannelRecord>, StorageError>;

    /// Registers a channel. [`StorageError::AlreadyExists`] if `telegram_id` is taken by anyone.
    async fn create(
        &self,
        telegram_id: i64,
        title: &str,
        owner_id: i64,
    ) -> Result<ChannelRecord, StorageError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelRecord>, StorageError>;

    /// Removes a registration owned by `owner_id`. Returns false if there was nothing to remove.
    async fn remove(&self, id: i64, owner_id: i64) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn create(&self, entry: &NewScheduledEntry) -> Result<ScheduledEntry, StorageError>;

    /// Entries with `post_at <= now`, oldest first.
    async fn due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledEntry>, StorageError>;

    /// Pending entries of one submitter, soonest first.
    async fn list_by_submitter(
        &self,
        submitted_by: i64,
    ) -> Result<Vec<ScheduledEntry>, StorageError>;

    /// All pending entries, soonest first.
    async fn list_pending(&self) -> Result<Vec<ScheduledEntry>, StorageError>;

    async fn find(&self, id: i64) -> Result<Option<ScheduledEntry>, StorageError>;

    /// Deletes by id. Idempotent: returns false if the entry was already gone.
    async fn delete(&self, id: i64) -> Result<bool, StorageError>;

    /// Deletes by id only if it belongs to `submitted_by`. Idempotent like [`ScheduleStore::delete`].
    async fn delete_owned(&self, id: i64, submitted_by: i64) -> Result<bool, StorageError>;
}
