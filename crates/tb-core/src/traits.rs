//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Reply, ReplyUpdate, Thread};

/// Document-store contract for threads and their embedded replies.
///
/// Every mutating method touches exactly one thread document and must be
/// atomic with respect to that document: two concurrent `push_reply` calls on
/// the same thread must both land.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn insert_thread(&self, thread: &Thread) -> anyhow::Result<()>;

    /// Threads on `board`, most recently bumped first, at most `limit`.
    /// Replies come back in insertion order.
    async fn list_recent(&self, board: &str, limit: i64) -> anyhow::Result<Vec<Thread>>;

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>>;

    /// Removes the thread and its replies. Returns false if it did not exist.
    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Sets `reported`. Returns false if the thread did not exist.
    async fn report_thread(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Appends `reply` and bumps the thread to `reply.created_on` in one step.
    /// Returns false if the thread did not exist.
    async fn push_reply(&self, thread_id: Uuid, reply: &Reply) -> anyhow::Result<bool>;

    /// Applies `update` to one reply in place. Returns false if either the
    /// thread or the reply did not exist.
    async fn update_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        update: &ReplyUpdate,
    ) -> anyhow::Result<bool>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> anyhow::Result<()>;
}
