//! # tb-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `tb-core` thread documents. A thread and its replies live in two
//! tables; the reply `position` column preserves append order.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{QueryBuilder, Row, Sqlite};
use tb_core::models::{Reply, ReplyUpdate, Thread};
use tb_core::traits::ThreadStore;
use uuid::Uuid;

/// Applied on every connect; every statement is idempotent.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS threads (
    id              BLOB PRIMARY KEY NOT NULL,
    board           TEXT NOT NULL,
    text            TEXT NOT NULL,
    created_on      TEXT NOT NULL,
    bumped_on       TEXT NOT NULL,
    delete_password TEXT NOT NULL,
    reported        INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_threads_board_bumped ON threads(board, bumped_on DESC);

CREATE TABLE IF NOT EXISTS replies (
    id              BLOB PRIMARY KEY NOT NULL,
    thread_id       BLOB NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
    position        INTEGER NOT NULL,
    text            TEXT NOT NULL,
    created_on      TEXT NOT NULL,
    delete_password TEXT NOT NULL,
    reported        INTEGER NOT NULL DEFAULT 0,
    UNIQUE (thread_id, position)
);
"#;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub struct SqliteThreadStore {
    pool: SqlitePool,
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Ok(Uuid::from_slice(blob)?)
}

// Fixed-width nanosecond text, so `ORDER BY` and `MAX()` compare chronologically.
fn timestamp_to_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn timestamp_column(row: &SqliteRow, column: &str) -> anyhow::Result<DateTime<Utc>> {
    let raw: String = row.try_get(column)?;
    Ok(DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc))
}

fn row_to_thread(row: &SqliteRow) -> anyhow::Result<Thread> {
    Ok(Thread {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        board: row.try_get("board")?,
        text: row.try_get("text")?,
        created_on: timestamp_column(row, "created_on")?,
        bumped_on: timestamp_column(row, "bumped_on")?,
        delete_password: row.try_get("delete_password")?,
        reported: row.try_get("reported")?,
        replies: Vec::new(),
    })
}

fn row_to_reply(row: &SqliteRow) -> anyhow::Result<Reply> {
    Ok(Reply {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        text: row.try_get("text")?,
        created_on: timestamp_column(row, "created_on")?,
        delete_password: row.try_get("delete_password")?,
        reported: row.try_get("reported")?,
    })
}

impl SqliteThreadStore {
    /// Connects with the default pool size and applies the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Connects and applies the schema.
    ///
    /// # Developer Note
    /// Every connection to `sqlite::memory:` opens its own empty database, so
    /// in-memory URLs get a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;
        tracing::info!(in_memory, "sqlite thread store ready");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    async fn reply_exists(&self, thread_id: Uuid, reply_id: Uuid) -> anyhow::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM replies WHERE id = ? AND thread_id = ?")
            .bind(uuid_to_blob(reply_id))
            .bind(uuid_to_blob(thread_id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl ThreadStore for SqliteThreadStore {
    async fn insert_thread(&self, thread: &Thread) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO threads (id, board, text, created_on, bumped_on, delete_password, reported)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(thread.id))
        .bind(&thread.board)
        .bind(&thread.text)
        .bind(timestamp_to_text(thread.created_on))
        .bind(timestamp_to_text(thread.bumped_on))
        .bind(&thread.delete_password)
        .bind(thread.reported)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Reads the threads and their replies inside one transaction so the
    /// listing is a consistent snapshot.
    async fn list_recent(&self, board: &str, limit: i64) -> anyhow::Result<Vec<Thread>> {
        let mut tx = self.pool.begin().await?;

        let mut threads = sqlx::query(
            "SELECT id, board, text, created_on, bumped_on, delete_password, reported
             FROM threads WHERE board = ? ORDER BY bumped_on DESC, id DESC LIMIT ?",
        )
        .bind(board)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(row_to_thread)
        .collect::<anyhow::Result<Vec<_>>>()?;

        if threads.is_empty() {
            tx.commit().await?;
            return Ok(threads);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, thread_id, text, created_on, delete_password, reported
             FROM replies WHERE thread_id IN (",
        );
        let mut separated = query.separated(", ");
        for thread in &threads {
            separated.push_bind(uuid_to_blob(thread.id));
        }
        separated.push_unseparated(") ORDER BY thread_id, position ASC");

        let rows = query.build().fetch_all(&mut *tx).await?;
        tx.commit().await?;

        let mut replies: HashMap<Uuid, Vec<Reply>> = HashMap::new();
        for row in &rows {
            let thread_id = blob_to_uuid(row.try_get::<Vec<u8>, _>("thread_id")?.as_slice())?;
            replies.entry(thread_id).or_default().push(row_to_reply(row)?);
        }
        for thread in &mut threads {
            thread.replies = replies.remove(&thread.id).unwrap_or_default();
        }

        Ok(threads)
    }

    /// Retrieves a thread and all its replies in a single logical operation.
    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, board, text, created_on, bumped_on, delete_password, reported
             FROM threads WHERE id = ?",
        )
        .bind(uuid_to_blob(id))
        .fetch_optional(&mut *tx)
        .await?;

        let mut thread = match row {
            Some(row) => row_to_thread(&row)?,
            None => {
                tx.commit().await?;
                return Ok(None);
            }
        };

        thread.replies = sqlx::query(
            "SELECT id, text, created_on, delete_password, reported
             FROM replies WHERE thread_id = ? ORDER BY position ASC",
        )
        .bind(uuid_to_blob(id))
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(row_to_reply)
        .collect::<anyhow::Result<Vec<_>>>()?;

        tx.commit().await?;
        Ok(Some(thread))
    }

    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM replies WHERE thread_id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await?;
        let affected = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(affected > 0)
    }

    async fn report_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        let affected = sqlx::query("UPDATE threads SET reported = 1 WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// Atomic append + bump.
    ///
    /// # Developer Note
    /// The UPDATE runs first so the transaction holds the write lock before
    /// the next `position` is computed; concurrent appends serialize here.
    async fn push_reply(&self, thread_id: Uuid, reply: &Reply) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query("UPDATE threads SET bumped_on = MAX(bumped_on, ?) WHERE id = ?")
            .bind(timestamp_to_text(reply.created_on))
            .bind(uuid_to_blob(thread_id))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if bumped == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO replies (id, thread_id, position, text, created_on, delete_password, reported)
             VALUES (?, ?, (SELECT COALESCE(MAX(position), -1) + 1 FROM replies WHERE thread_id = ?), ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(reply.id))
        .bind(uuid_to_blob(thread_id))
        .bind(uuid_to_blob(thread_id))
        .bind(&reply.text)
        .bind(timestamp_to_text(reply.created_on))
        .bind(&reply.delete_password)
        .bind(reply.reported)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn update_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        update: &ReplyUpdate,
    ) -> anyhow::Result<bool> {
        if update.is_empty() {
            return self.reply_exists(thread_id, reply_id).await;
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE replies SET ");
        let mut separated = query.separated(", ");

        if let Some(ref text) = update.text {
            separated.push("text = ");
            separated.push_bind_unseparated(text.clone());
        }
        if let Some(reported) = update.reported {
            separated.push("reported = ");
            separated.push_bind_unseparated(reported);
        }

        query.push(" WHERE id = ");
        query.push_bind(uuid_to_blob(reply_id));
        query.push(" AND thread_id = ");
        query.push_bind(uuid_to_blob(thread_id));

        let affected = query.build().execute(&self.pool).await?.rows_affected();
        Ok(affected > 0)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
