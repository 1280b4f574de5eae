//! Shared helpers for storage integration tests.

use storage::SqlitePoolManager;
use tempfile::TempDir;

/// Returns a pool over a fresh SQLite file in a temp dir so each test gets an isolated DB.
/// Keep the TempDir alive for the duration of the test.
pub async fn fresh_pool() -> (TempDir, SqlitePoolManager) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("test.db");
    let pool = SqlitePoolManager::new(&path.to_string_lossy())
        .await
        .expect("Failed to open pool");
    (dir, pool)
}
