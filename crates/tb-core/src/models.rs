//! # Domain Models
//!
//! These structs represent the core entities of Threadboard.
//! We use UUID v7 for time-ordered, globally unique identification; threads
//! and replies draw from the same identifier space.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text a reply is overwritten with when its author deletes it.
pub const DELETED_TEXT: &str = "[deleted]";

/// Maximum number of threads returned by a board listing.
pub const RECENT_THREAD_LIMIT: i64 = 10;

/// Maximum number of replies previewed per thread in a board listing.
pub const PREVIEW_REPLY_LIMIT: usize = 3;

/// A discussion thread on a board, stored together with all of its replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Name of the board the thread was posted to (e.g. "b")
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    /// The timestamp used for sorting threads by activity
    pub bumped_on: DateTime<Utc>,
    pub delete_password: String,
    pub reported: bool,
    /// Replies in the order they were appended
    pub replies: Vec<Reply>,
}

impl Thread {
    pub fn new(
        board: impl Into<String>,
        text: impl Into<String>,
        delete_password: impl Into<String>,
    ) -> Self {
        Self::new_at(board, text, delete_password, Utc::now())
    }

    /// Builds a fresh thread with `created_on == bumped_on == now`.
    pub fn new_at(
        board: impl Into<String>,
        text: impl Into<String>,
        delete_password: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            board: board.into(),
            text: text.into(),
            created_on: now,
            bumped_on: now,
            delete_password: delete_password.into(),
            reported: false,
            replies: Vec::new(),
        }
    }

    /// Plain-text, case-sensitive comparison against the stored password.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.delete_password == candidate
    }

    pub fn reply(&self, reply_id: Uuid) -> Option<&Reply> {
        self.replies.iter().find(|r| r.id == reply_id)
    }

    pub fn reply_mut(&mut self, reply_id: Uuid) -> Option<&mut Reply> {
        self.replies.iter_mut().find(|r| r.id == reply_id)
    }

    /// Moves `bumped_on` forward to `at`. Never moves it backwards.
    pub fn bump(&mut self, at: DateTime<Utc>) {
        if at > self.bumped_on {
            self.bumped_on = at;
        }
    }

    /// Appends a reply and bumps the thread to the reply's creation time.
    pub fn push_reply(&mut self, reply: Reply) {
        self.bump(reply.created_on);
        self.replies.push(reply);
    }

    /// The last `n` replies in insertion order, i.e. the most recent ones.
    pub fn recent_replies(&self, n: usize) -> &[Reply] {
        let start = self.replies.len().saturating_sub(n);
        &self.replies[start..]
    }

    /// Board-listing view: thread secrets stripped, replies capped to the
    /// most recent [`PREVIEW_REPLY_LIMIT`]. Replies are passed through untouched.
    pub fn into_summary(self) -> ThreadSummary {
        let replies = self.recent_replies(PREVIEW_REPLY_LIMIT).to_vec();
        ThreadSummary {
            id: self.id,
            board: self.board,
            text: self.text,
            created_on: self.created_on,
            bumped_on: self.bumped_on,
            replies,
        }
    }

    /// Full-thread view: secrets stripped at both thread and reply level.
    pub fn into_detail(self) -> ThreadDetail {
        ThreadDetail {
            id: self.id,
            board: self.board,
            text: self.text,
            created_on: self.created_on,
            bumped_on: self.bumped_on,
            replies: self.replies.into_iter().map(ReplyView::from).collect(),
        }
    }
}

/// A reply inside a thread. Has no existence outside its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub delete_password: String,
    pub reported: bool,
}

impl Reply {
    pub fn new(text: impl Into<String>, delete_password: impl Into<String>) -> Self {
        Self::new_at(text, delete_password, Utc::now())
    }

    pub fn new_at(
        text: impl Into<String>,
        delete_password: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            created_on: now,
            delete_password: delete_password.into(),
            reported: false,
        }
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.delete_password == candidate
    }

    pub fn apply(&mut self, update: &ReplyUpdate) {
        if let Some(ref text) = update.text {
            self.text = text.clone();
        }
        if let Some(reported) = update.reported {
            self.reported = reported;
        }
    }
}

/// Field-level update of a single reply, applied by the store in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyUpdate {
    pub text: Option<String>,
    pub reported: Option<bool>,
}

impl ReplyUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft delete: overwrite the text with [`DELETED_TEXT`].
    pub fn soft_delete(mut self) -> Self {
        self.text = Some(DELETED_TEXT.to_string());
        self
    }

    pub fn report(mut self) -> Self {
        self.reported = Some(true);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.reported.is_none()
    }
}

/// Thread as returned by the board listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<Reply>,
}

/// Thread as returned by the full-thread fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDetail {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
}

/// Reply with `delete_password` and `reported` removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        Self {
            id: reply.id,
            text: reply.text,
            created_on: reply.created_on,
        }
    }
}

/// Result of a password-gated deletion. A mismatch is an expected outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    IncorrectPassword,
}

impl DeleteOutcome {
    /// The literal response body for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "success",
            DeleteOutcome::IncorrectPassword => "incorrect password",
        }
    }
}
