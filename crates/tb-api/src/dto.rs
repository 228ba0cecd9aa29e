//! Request shapes for the board API.
//!
//! Field names follow the public contract (`threadid`, `replyid`,
//! `delete_password`); the aliases cover older clients.

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub text: String,
    #[serde(alias = "deletepassword")]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteThreadRequest {
    #[serde(alias = "thread_id")]
    pub threadid: Uuid,
    #[serde(alias = "deletepassword")]
    pub delete_password: String,
}

/// Thread reference that may arrive in the body, the query string, or both.
/// Kept as raw text so a malformed id never fails extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadRef {
    #[serde(default, alias = "thread_id", alias = "threadid_")]
    pub threadid: Option<String>,
}

impl ThreadRef {
    pub fn thread_id(&self) -> Option<Uuid> {
        self.threadid.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateReplyRequest {
    #[serde(alias = "thread_id")]
    pub threadid: Uuid,
    pub text: String,
    #[serde(alias = "deletepassword")]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct GetThreadQuery {
    #[serde(alias = "thread_id")]
    pub threadid: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReplyRequest {
    #[serde(alias = "thread_id")]
    pub threadid: Uuid,
    #[serde(alias = "reply_id")]
    pub replyid: Uuid,
    #[serde(alias = "deletepassword")]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportReplyRequest {
    #[serde(alias = "thread_id")]
    pub threadid: Uuid,
    #[serde(alias = "reply_id")]
    pub replyid: Uuid,
}
