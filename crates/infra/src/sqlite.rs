//! SQLite-backed durable session storage.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use sqlx::{Row, SqlitePool};
use tokio::runtime::Runtime;
use tokio::sync::Mutex;

use darzi_session::{SessionStorage, StorageError};

/// SQLite-backed [`SessionStorage`] (lazy initialization).
///
/// Construction never touches the filesystem; the database file and its
/// schema are created on first use.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    path: PathBuf,
    /// Shared pool handle.
    ///
    /// `SqlitePool` is already `Send + Sync`; the `Arc<Mutex<_>>` wrapper
    /// makes lazy initialization race-free across cloned handles.
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteSessionStore {
    /// Open a store at the given database path.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Initialize the database connection (called lazily on first use).
    async fn ensure_initialized(&self) -> anyhow::Result<()> {
        let mut pool_guard = self.pool.lock().await;
        if pool_guard.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create session store directory {parent:?}"))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", self.path.to_string_lossy());
        let pool = SqlitePool::connect(&db_url)
            .await
            .with_context(|| format!("failed to open session store at {:?}", self.path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_state (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create session_state table")?;

        *pool_guard = Some(pool);
        Ok(())
    }

    /// Get the pool, initializing if necessary.
    async fn get_pool(&self) -> anyhow::Result<SqlitePool> {
        self.ensure_initialized().await?;
        let pool_guard = self.pool.lock().await;
        pool_guard
            .clone()
            .context("session store pool missing after initialization")
    }

    /// The [`SessionStorage`] seam is synchronous; bridge into the async
    /// sqlx API on a throwaway runtime, the way the suite's local caches do.
    fn block_on<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, StorageError> {
        let rt = Runtime::new()
            .map_err(|err| StorageError::Backend(format!("failed to create runtime: {err}")))?;
        rt.block_on(fut)
            .map_err(|err| StorageError::Backend(format!("{err:#}")))
    }
}

impl SessionStorage for SqliteSessionStore {
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.block_on(async {
            let pool = self.get_pool().await?;
            sqlx::query(
                r#"
                INSERT INTO session_state (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&pool)
            .await
            .with_context(|| format!("failed to upsert session key '{key}'"))?;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.block_on(async {
            let pool = self.get_pool().await?;
            let row = sqlx::query("SELECT value FROM session_state WHERE key = ?1")
                .bind(key)
                .fetch_optional(&pool)
                .await
                .with_context(|| format!("failed to read session key '{key}'"))?;
            Ok(row.map(|r| r.get::<String, _>(0)))
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.block_on(async {
            let pool = self.get_pool().await?;
            sqlx::query("DELETE FROM session_state WHERE key = ?1")
                .bind(key)
                .execute(&pool)
                .await
                .with_context(|| format!("failed to delete session key '{key}'"))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSessionStore::open(dir.path().join("session.db"));

        assert_eq!(store.get("viewMode").unwrap(), None);

        store.put("viewMode", "singleShop").unwrap();
        assert_eq!(
            store.get("viewMode").unwrap().as_deref(),
            Some("singleShop")
        );

        store.put("viewMode", "allShops").unwrap();
        assert_eq!(store.get("viewMode").unwrap().as_deref(), Some("allShops"));

        store.delete("viewMode").unwrap();
        assert_eq!(store.get("viewMode").unwrap(), None);
    }

    #[test]
    fn delete_of_missing_key_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSessionStore::open(dir.path().join("session.db"));
        store.delete("missing").unwrap();
    }

    #[test]
    fn values_survive_reopening_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.db");

        let store = SqliteSessionStore::open(&path);
        store.put("selectedShopId", "s1").unwrap();
        drop(store);

        let reopened = SqliteSessionStore::open(&path);
        assert_eq!(
            reopened.get("selectedShopId").unwrap().as_deref(),
            Some("s1")
        );
    }

    #[test]
    fn cloned_handles_share_the_same_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSessionStore::open(dir.path().join("session.db"));
        let clone = store.clone();

        store.put("k", "v").unwrap();
        assert_eq!(clone.get("k").unwrap().as_deref(), Some("v"));
    }
}
