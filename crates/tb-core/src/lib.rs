//! threadboard/crates/tb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Threadboard.

pub mod error;
pub mod models;
pub mod service;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use service::BoardService;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_thread_creation_v7() {
        let thread = Thread::new("b", "Hello Rust!", "hunter2");
        assert_eq!(thread.created_on, thread.bumped_on);
        assert!(!thread.reported);
        assert!(thread.replies.is_empty());
        assert_eq!(thread.id.get_version_num(), 7);
    }

    #[test]
    fn test_bump_never_moves_backwards() {
        let now = Utc::now();
        let mut thread = Thread::new_at("b", "op", "pw", now);

        thread.bump(now - Duration::seconds(5));
        assert_eq!(thread.bumped_on, now);

        thread.push_reply(Reply::new_at("r", "pw", now + Duration::seconds(1)));
        assert_eq!(thread.bumped_on, now + Duration::seconds(1));
        assert!(thread.bumped_on >= thread.created_on);
    }

    #[test]
    fn test_recent_replies_takes_tail() {
        let now = Utc::now();
        let mut thread = Thread::new_at("b", "op", "pw", now);
        for i in 0..5 {
            thread.push_reply(Reply::new_at(format!("reply {}", i), "pw", now + Duration::seconds(i)));
        }

        let texts: Vec<_> = thread.recent_replies(3).iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["reply 2", "reply 3", "reply 4"]);
        assert_eq!(thread.recent_replies(10).len(), 5);
    }

    #[test]
    fn test_summary_strips_thread_secrets_only() {
        let mut thread = Thread::new("b", "op", "secret");
        thread.reported = true;
        thread.push_reply(Reply::new("first", "reply-secret"));

        let json = serde_json::to_value(thread.into_summary()).unwrap();
        assert!(json.get("reported").is_none());
        assert!(json.get("delete_password").is_none());
        assert!(json.get("_id").is_some());
        assert_eq!(json["replies"][0]["delete_password"], "reply-secret");
        assert_eq!(json["replies"][0]["reported"], false);
    }

    #[test]
    fn test_detail_strips_reply_secrets() {
        let mut thread = Thread::new("b", "op", "secret");
        for i in 0..4 {
            thread.push_reply(Reply::new(format!("r{}", i), "pw"));
        }

        let json = serde_json::to_value(thread.into_detail()).unwrap();
        assert!(json.get("reported").is_none());
        assert!(json.get("delete_password").is_none());
        let replies = json["replies"].as_array().unwrap();
        assert_eq!(replies.len(), 4);
        for reply in replies {
            assert!(reply.get("delete_password").is_none());
            assert!(reply.get("reported").is_none());
            assert!(reply.get("text").is_some());
            assert!(reply.get("created_on").is_some());
        }
    }

    #[test]
    fn test_reply_update_apply() {
        let mut reply = Reply::new("hello", "pw");
        let before = reply.clone();

        reply.apply(&ReplyUpdate::new().soft_delete());
        assert_eq!(reply.text, DELETED_TEXT);
        assert_eq!(reply.id, before.id);
        assert_eq!(reply.created_on, before.created_on);
        assert!(!reply.reported);

        reply.apply(&ReplyUpdate::new().report());
        assert!(reply.reported);
        assert!(ReplyUpdate::new().is_empty());
    }

    #[test]
    fn test_delete_outcome_literals() {
        assert_eq!(DeleteOutcome::Deleted.as_str(), "success");
        assert_eq!(DeleteOutcome::IncorrectPassword.as_str(), "incorrect password");
    }
}
