use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use async_trait::async_trait;
use shared::domain::{Todo, TodoId};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};

use crate::{ensure_unique_ids, Storage, StoreError};

/// Persistent backend keeping every table in a single `records` relation.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

impl SqliteStorage {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `:memory:` opens its own database, so pin one.
        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(%database_url, "sqlite storage ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn seed(&self, table: &str, records: Vec<Todo>) -> Result<(), StoreError> {
        ensure_unique_ids(table, &records)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM records WHERE table_name = ?")
            .bind(table)
            .execute(&mut *tx)
            .await?;
        for record in &records {
            sqlx::query("INSERT INTO records (table_name, id, task, status) VALUES (?, ?, ?, ?)")
                .bind(table)
                .bind(record.id.as_str())
                .bind(&record.task)
                .bind(&record.status)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::debug!(table, count = records.len(), "seeded sqlite table");
        Ok(())
    }

    async fn get(&self, table: &str) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, task, status FROM records WHERE table_name = ? ORDER BY seq ASC",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(todo_from_row).collect()
    }

    async fn put(&self, table: &str, record: Todo) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO records (table_name, id, task, status) VALUES (?, ?, ?, ?)
             ON CONFLICT(table_name, id) DO UPDATE SET task = excluded.task, status = excluded.status",
        )
        .bind(table)
        .bind(record.id.as_str())
        .bind(&record.task)
        .bind(&record.status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &TodoId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE table_name = ? AND id = ?")
            .bind(table)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn todo_from_row(row: &SqliteRow) -> Result<Todo, StoreError> {
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        task: row.try_get("task")?,
        status: row.try_get("status")?,
    })
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<(), StoreError> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(parent)?;
    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}
