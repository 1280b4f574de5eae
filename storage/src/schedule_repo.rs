//! Scheduled-post queue backed by SQLite.
//!
//! Deletion is by primary key and idempotent, so a publisher sweep racing a user's manual
//! cancellation never errors and never leaves a row behind to be delivered twice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::StorageError;
use crate::models::{NewScheduledEntry, ScheduledEntry, ScheduledEntryRow};
use crate::repository::ScheduleStore;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct ScheduleRepository {
    pool_manager: SqlitePoolManager,
}

impl ScheduleRepository {
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating scheduled_posts table if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scheduled_posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                channel_id INTEGER NOT NULL,
                data TEXT NOT NULL,
                post_at INTEGER NOT NULL,
                submitted_by INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_scheduled_posts_post_at ON scheduled_posts(post_at);
            CREATE INDEX IF NOT EXISTS idx_scheduled_posts_submitted_by ON scheduled_posts(submitted_by);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Rows that fail to convert are logged and left out, so one bad row never hides the rest.
    fn convert(rows: Vec<ScheduledEntryRow>) -> Vec<ScheduledEntry> {
        rows.into_iter()
            .filter_map(|row| match ScheduledEntry::try_from(row) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable scheduled post");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl ScheduleStore for ScheduleRepository {
    async fn create(&self, entry: &NewScheduledEntry) -> Result<ScheduledEntry, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO scheduled_posts (channel_id, data, post_at, submitted_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.channel_id)
        .bind(&entry.data)
        .bind(entry.post_at.timestamp())
        .bind(entry.submitted_by)
        .bind(Utc::now().timestamp())
        .execute(self.pool_manager.pool())
        .await?;

        let id = result.last_insert_rowid();
        info!(
            entry_id = id,
            channel_id = entry.channel_id,
            submitted_by = entry.submitted_by,
            post_at = %entry.post_at,
            "Saved scheduled post"
        );

        self.find(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("scheduled post {}", id)))
    }

    async fn due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledEntry>, StorageError> {
        let rows = sqlx::query_as::<_, ScheduledEntryRow>(
            "SELECT * FROM scheduled_posts WHERE post_at <= ? ORDER BY post_at, id",
        )
        .bind(now.timestamp())
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(Self::convert(rows))
    }

    async fn list_by_submitter(
        &self,
        submitted_by: i64,
    ) -> Result<Vec<ScheduledEntry>, StorageError> {
        let rows = sqlx::query_as::<_, ScheduledEntryRow>(
            "SELECT * FROM scheduled_posts WHERE submitted_by = ? ORDER BY post_at, id",
        )
        .bind(submitted_by)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(Self::convert(rows))
    }

    async fn list_pending(&self) -> Result<Vec<ScheduledEntry>, StorageError> {
        let rows = sqlx::query_as::<_, ScheduledEntryRow>(
            "SELECT * FROM scheduled_posts ORDER BY post_at, id",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(Self::convert(rows))
    }

    async fn find(&self, id: i64) -> Result<Option<ScheduledEntry>, StorageError> {
        let row = sqlx::query_as::<_, ScheduledEntryRow>(
            "SELECT * FROM scheduled_posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        row.map(ScheduledEntry::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM scheduled_posts WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: i64, submitted_by: i64) -> Result<bool, StorageError> {
        let result =
            sqlx::query("DELETE FROM scheduled_posts WHERE id = ? AND submitted_by = ?")
                .bind(id)
                .bind(submitted_by)
                .execute(self.pool_manager.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
