//! # BoardService
//!
//! Translates each board operation into a single call against the injected
//! [`ThreadStore`], applying field visibility and password checks on the way.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    DeleteOutcome, Reply, ReplyUpdate, Thread, ThreadDetail, ThreadSummary, RECENT_THREAD_LIMIT,
};
use crate::traits::ThreadStore;

#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn ThreadStore>,
}

impl BoardService {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, text, delete_password))]
    pub async fn create_thread(
        &self,
        board: &str,
        text: &str,
        delete_password: &str,
    ) -> Result<Thread> {
        let thread = Thread::new(board, text, delete_password);
        self.store.insert_thread(&thread).await?;
        info!(thread_id = %thread.id, "thread created");
        Ok(thread)
    }

    /// Ten most recently bumped threads, three most recent replies each.
    #[instrument(skip(self))]
    pub async fn list_recent_threads(&self, board: &str) -> Result<Vec<ThreadSummary>> {
        let threads = self.store.list_recent(board, RECENT_THREAD_LIMIT).await?;
        Ok(threads.into_iter().map(Thread::into_summary).collect())
    }

    #[instrument(skip(self, delete_password))]
    pub async fn delete_thread(
        &self,
        thread_id: Uuid,
        delete_password: &str,
    ) -> Result<DeleteOutcome> {
        let thread = self
            .store
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::thread_not_found(thread_id))?;

        if !thread.password_matches(delete_password) {
            info!("thread delete rejected: incorrect password");
            return Ok(DeleteOutcome::IncorrectPassword);
        }

        if !self.store.delete_thread(thread_id).await? {
            return Err(AppError::thread_not_found(thread_id));
        }
        info!("thread deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Flags a thread for review. A missing thread is not reported back to
    /// the caller.
    #[instrument(skip(self))]
    pub async fn report_thread(&self, thread_id: Uuid) -> Result<()> {
        if self.store.report_thread(thread_id).await? {
            info!("thread reported");
        } else {
            debug!("report for unknown thread ignored");
        }
        Ok(())
    }

    /// Appends a reply and bumps the parent thread.
    #[instrument(skip(self, text, delete_password))]
    pub async fn create_reply(
        &self,
        thread_id: Uuid,
        text: &str,
        delete_password: &str,
    ) -> Result<Reply> {
        let reply = Reply::new(text, delete_password);
        if !self.store.push_reply(thread_id, &reply).await? {
            return Err(AppError::thread_not_found(thread_id));
        }
        info!(reply_id = %reply.id, "reply created");
        Ok(reply)
    }

    #[instrument(skip(self))]
    pub async fn get_thread(&self, thread_id: Uuid) -> Result<ThreadDetail> {
        let thread = self
            .store
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::thread_not_found(thread_id))?;
        Ok(thread.into_detail())
    }

    /// Soft-deletes a reply: its text becomes `[deleted]`, everything else stays.
    #[instrument(skip(self, delete_password))]
    pub async fn delete_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        delete_password: &str,
    ) -> Result<DeleteOutcome> {
        let thread = self
            .store
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::thread_not_found(thread_id))?;
        let reply = thread
            .reply(reply_id)
            .ok_or_else(|| AppError::reply_not_found(reply_id))?;

        if !reply.password_matches(delete_password) {
            info!("reply delete rejected: incorrect password");
            return Ok(DeleteOutcome::IncorrectPassword);
        }

        let update = ReplyUpdate::new().soft_delete();
        if !self.store.update_reply(thread_id, reply_id, &update).await? {
            return Err(AppError::reply_not_found(reply_id));
        }
        info!("reply deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Flags a reply for review. Unlike [`Self::report_thread`], a missing
    /// thread or reply is an error.
    #[instrument(skip(self))]
    pub async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> Result<()> {
        let update = ReplyUpdate::new().report();
        if !self.store.update_reply(thread_id, reply_id, &update).await? {
            return Err(AppError::reply_not_found(reply_id));
        }
        info!("reply reported");
        Ok(())
    }

    pub async fn health(&self) -> Result<()> {
        self.store.ping().await?;
        Ok(())
    }
}
