//! # tb-db-memory
//!
//! In-process implementation of `ThreadStore` backed by a `DashMap`.
//! Each thread document lives in one map entry, so every mutation holds that
//! entry's shard lock for its full duration. Nothing survives a restart.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tb_core::models::{Reply, ReplyUpdate, Thread};
use tb_core::traits::ThreadStore;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryThreadStore {
    threads: DashMap<Uuid, Thread>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn insert_thread(&self, thread: &Thread) -> anyhow::Result<()> {
        match self.threads.entry(thread.id) {
            Entry::Occupied(_) => anyhow::bail!("thread {} already exists", thread.id),
            Entry::Vacant(slot) => {
                slot.insert(thread.clone());
                Ok(())
            }
        }
    }

    async fn list_recent(&self, board: &str, limit: i64) -> anyhow::Result<Vec<Thread>> {
        let mut threads: Vec<Thread> = self
            .threads
            .iter()
            .filter(|entry| entry.board == board)
            .map(|entry| entry.value().clone())
            .collect();

        threads.sort_by(|a, b| b.bumped_on.cmp(&a.bumped_on).then_with(|| b.id.cmp(&a.id)));
        threads.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(threads)
    }

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        Ok(self.threads.get(&id).map(|entry| entry.value().clone()))
    }

    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.threads.remove(&id).is_some())
    }

    async fn report_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        match self.threads.get_mut(&id) {
            Some(mut thread) => {
                thread.reported = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn push_reply(&self, thread_id: Uuid, reply: &Reply) -> anyhow::Result<bool> {
        match self.threads.get_mut(&thread_id) {
            Some(mut thread) => {
                thread.push_reply(reply.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        update: &ReplyUpdate,
    ) -> anyhow::Result<bool> {
        let Some(mut thread) = self.threads.get_mut(&thread_id) else {
            return Ok(false);
        };
        match thread.reply_mut(reply_id) {
            Some(reply) => {
                reply.apply(update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
