//! User repository: lazy creation and compare-and-swap state transitions.

use async_trait::async_trait;
use chrono::Utc;
use postbot_core::ConversationState;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::models::{UserRecord, UserUpdate};
use crate::repository::UserStore;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating users table if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                telegram_id INTEGER PRIMARY KEY,
                username TEXT,
                state TEXT NOT NULL DEFAULT 'IDLE',
                draft TEXT NOT NULL DEFAULT '',
                selected_channel_id INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get_or_create(
        &self,
        telegram_id: i64,
        username: Option<&str>,
    ) -> Result<UserRecord, StorageError> {
        let pool = self.pool_manager.pool();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (telegram_id, username, state, draft, selected_channel_id, created_at, updated_at)
            VALUES (?, ?, ?, '', NULL, ?, ?)
            ON CONFLICT(telegram_id) DO UPDATE SET username = excluded.username
            "#,
        )
        .bind(telegram_id)
        .bind(username)
        .bind(ConversationState::Idle.as_str())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        self.find(telegram_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {}", telegram_id)))
    }

    async fn find(&self, telegram_id: i64) -> Result<Option<UserRecord>, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(user)
    }

    async fn transition(
        &self,
        telegram_id: i64,
        expected: ConversationState,
        update: &UserUpdate,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET state = ?, draft = ?, selected_channel_id = ?, updated_at = ?
            WHERE telegram_id = ? AND state = ?
            "#,
        )
        .bind(update.state.as_str())
        .bind(&update.draft)
        .bind(update.selected_channel_id)
        .bind(Utc::now())
        .bind(telegram_id)
        .bind(expected.as_str())
        .execute(self.pool_manager.pool())
        .await?;

        if result.rows_affected() == 1 {
            debug!(
                user_id = telegram_id,
                from = %expected,
                to = %update.state,
                "User state transition"
            );
            return Ok(());
        }

        match self.find(telegram_id).await? {
            None => Err(StorageError::NotFound(format!("user {}", telegram_id))),
            Some(current) => {
                warn!(
                    user_id = telegram_id,
                    expected = %expected,
                    actual = %current.state,
                    "Rejected state transition: precondition no longer holds"
                );
                Err(StorageError::StateConflict {
                    user_id: telegram_id,
                    expected: expected.to_string(),
                    actual: current.state,
                })
            }
        }
    }

    async fn reset(&self, telegram_id: i64) -> Result<(), StorageError> {
        let update = UserUpdate::idle();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET state = ?, draft = ?, selected_channel_id = ?, updated_at = ?
            WHERE telegram_id = ?
            "#,
        )
        .bind(update.state.as_str())
        .bind(&update.draft)
        .bind(update.selected_channel_id)
        .bind(Utc::now())
        .bind(telegram_id)
        .execute(self.pool_manager.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("user {}", telegram_id)));
        }
        Ok(())
    }
}
