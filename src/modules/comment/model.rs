use std::collections::BTreeSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::ServiceError;

pub const TEXT_MIN: usize = 3;
pub const TEXT_MAX: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Rejected,
    Pending,
    Approved,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Rejected => "rejected",
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
        }
    }
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rejected" => Some(ModerationStatus::Rejected),
            "pending" => Some(ModerationStatus::Pending),
            "approved" => Some(ModerationStatus::Approved),
            _ => None,
        }
    }
}

/// Root comment document. The entire reply tree is embedded in `replies`,
/// so one of these is the unit of storage and of write contention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub status: ModerationStatus,
    pub open_to_replies: bool,
    pub likes: BTreeSet<Uuid>,
    pub dislikes: BTreeSet<Uuid>,
    pub replies: Vec<Reply>,
    pub created_at: DateTime<Utc>,
}

/// Reply node, recursive: lives in a root's `replies` or in another reply's
/// `children`. `parent_comment_id` always names the owning root;
/// `parent_reply_id` is set only when the reply answers another reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Uuid,
    pub product_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub status: ModerationStatus,
    pub open_to_replies: bool,
    pub parent_comment_id: Uuid,
    pub parent_reply_id: Option<Uuid>,
    pub likes: BTreeSet<Uuid>,
    pub dislikes: BTreeSet<Uuid>,
    pub children: Vec<Reply>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(product_id: Uuid, author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            author_id,
            text,
            status: ModerationStatus::Approved,
            open_to_replies: true,
            likes: BTreeSet::new(),
            dislikes: BTreeSet::new(),
            replies: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

impl Reply {
    pub fn new(
        product_id: Uuid,
        author_id: Uuid,
        text: String,
        parent_comment_id: Uuid,
        parent_reply_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            author_id,
            text,
            status: ModerationStatus::Approved,
            open_to_replies: true,
            parent_comment_id,
            parent_reply_id,
            likes: BTreeSet::new(),
            dislikes: BTreeSet::new(),
            children: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Field-level patch applied to exactly one node. `None` fields are left
/// untouched; reaction sets are replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub text: Option<String>,
    pub status: Option<ModerationStatus>,
    pub reactions: Option<ReactionSets>,
}

#[derive(Debug, Clone)]
pub struct ReactionSets {
    pub likes: BTreeSet<Uuid>,
    pub dislikes: BTreeSet<Uuid>,
}

pub fn validate_text(text: &str) -> Result<(), ServiceError> {
    let length = text.chars().count();
    if length < TEXT_MIN || length > TEXT_MAX {
        return Err(ServiceError::Validation(format!(
            "Comment text must be between {} and {} characters.",
            TEXT_MIN, TEXT_MAX
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_length_bounds() {
        assert!(validate_text("ab").is_err());
        assert!(validate_text("abc").is_ok());
        assert!(validate_text(&"x".repeat(TEXT_MAX)).is_ok());
        assert!(validate_text(&"x".repeat(TEXT_MAX + 1)).is_err());
    }

    #[test]
    fn status_round_trip() {
        for status in [
            ModerationStatus::Rejected,
            ModerationStatus::Pending,
            ModerationStatus::Approved,
        ] {
            assert_eq!(ModerationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ModerationStatus::parse("spam"), None);
    }

    #[test]
    fn new_nodes_are_open_and_approved() {
        let root = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "First!".into());
        assert!(root.open_to_replies);
        assert_eq!(root.status, ModerationStatus::Approved);
        let reply = Reply::new(root.product_id, Uuid::new_v4(), "Me too".into(), root.id, None);
        assert!(reply.open_to_replies);
        assert_eq!(reply.parent_comment_id, root.id);
        assert!(reply.parent_reply_id.is_none());
    }
}
