use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::modules::{
    comment::model::{Comment, ModerationStatus, Reply},
    user::model::UserDisplay,
};

#[derive(Deserialize, Validate)]
pub struct CommentBody {
    #[validate(length(
        min = 3,
        max = 2000,
        message = "Comment must be between 3 and 2000 characters"
    ))]
    pub text: String,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// Flat record of a single node, returned by create/edit/moderate calls.
#[derive(Debug, Serialize)]
pub struct NodeRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub root_id: Uuid,
    pub parent_reply_id: Option<Uuid>,
    pub author_id: Uuid,
    pub text: String,
    pub status: ModerationStatus,
    pub open_to_replies: bool,
    pub likes_count: usize,
    pub dislikes_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for NodeRecord {
    fn from(comment: &Comment) -> Self {
        NodeRecord {
            id: comment.id,
            product_id: comment.product_id,
            root_id: comment.id,
            parent_reply_id: None,
            author_id: comment.author_id,
            text: comment.text.clone(),
            status: comment.status,
            open_to_replies: comment.open_to_replies,
            likes_count: comment.likes.len(),
            dislikes_count: comment.dislikes.len(),
            created_at: comment.created_at,
        }
    }
}

impl From<&Reply> for NodeRecord {
    fn from(reply: &Reply) -> Self {
        NodeRecord {
            id: reply.id,
            product_id: reply.product_id,
            root_id: reply.parent_comment_id,
            parent_reply_id: reply.parent_reply_id,
            author_id: reply.author_id,
            text: reply.text.clone(),
            status: reply.status,
            open_to_replies: reply.open_to_replies,
            likes_count: reply.likes.len(),
            dislikes_count: reply.dislikes.len(),
            created_at: reply.created_at,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ReactionSummary {
    pub likes_count: usize,
    pub dislikes_count: usize,
    pub user_liked: bool,
    pub user_disliked: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub author: UserDisplay,
    pub text: String,
    pub status: ModerationStatus,
    pub open_to_replies: bool,
    pub likes_count: usize,
    pub dislikes_count: usize,
    pub viewer_liked: bool,
    pub viewer_disliked: bool,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Serialize)]
pub struct ReplyView {
    pub id: Uuid,
    pub parent_comment_id: Uuid,
    pub parent_reply_id: Option<Uuid>,
    pub author: UserDisplay,
    pub text: String,
    pub status: ModerationStatus,
    pub open_to_replies: bool,
    pub likes_count: usize,
    pub dislikes_count: usize,
    pub viewer_liked: bool,
    pub viewer_disliked: bool,
    pub created_at: DateTime<Utc>,
    pub children: Vec<ReplyView>,
}
