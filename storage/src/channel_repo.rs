//! Channel registry backed by SQLite. Uniqueness of the external channel id is enforced here.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::models::ChannelRecord;
use crate::repository::ChannelRegistry;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct ChannelRepository {
    pool_manager: SqlitePoolManager,
}

impl ChannelRepository {
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating channels table if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS channels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                telegram_id INTEGER NOT NULL UNIQUE,
                title TEXT NOT NULL,
                added_by_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_channels_added_by_id ON channels(added_by_id)")
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ChannelRegistry for ChannelRepository {
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ChannelRecord>, StorageError> {
        let channels = sqlx::query_as::<_, ChannelRecord>(
            "SELECT * FROM channels WHERE added_by_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(channels)
    }

    async fn find_by_external_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<ChannelRecord>, StorageError> {
        let channel =
            sqlx::query_as::<_, ChannelRecord>("SELECT * FROM channels WHERE telegram_id = ?")
                .bind(telegram_id)
                .fetch_optional(self.pool_manager.pool())
                .await?;
        Ok(channel)
    }

    async fn create(
        &self,
        telegram_id: i64,
        title: &str,
        owner_id: i64,
    ) -> Result<ChannelRecord, StorageError> {
        let result = sqlx::query(
            "INSERT INTO channels (telegram_id, title, added_by_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(telegram_id)
        .bind(title)
        .bind(owner_id)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StorageError::AlreadyExists(format!("channel {}", telegram_id))
            }
            other => StorageError::from(other),
        })?;

        let id = result.last_insert_rowid();
        info!(channel_id = id, telegram_id, owner_id, title = %title, "Registered channel");

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("channel {}", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelRecord>, StorageError> {
        let channel = sqlx::query_as::<_, ChannelRecord>("SELECT * FROM channels WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(channel)
    }

    async fn remove(&self, id: i64, owner_id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM channels WHERE id = ? AND added_by_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
