use uuid::Uuid;
use crate::modules::{
    comment::{model::ModerationStatus, tree::NodeRef},
    user::model::{Role, User},
};

/// The identity every authorization predicate sees. Collapsing the user to
/// id + admin flag keeps the gate independent of how identity is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor {
            id: user.id,
            is_admin: user.role == Role::Admin,
        }
    }
}

pub fn owns(actor: Actor, node: &NodeRef<'_>) -> bool {
    actor.id == node.author_id()
}

/// Only Pending text may still be reworded; Rejected and Approved lock it.
pub fn is_editable(node: &NodeRef<'_>) -> bool {
    node.status() == ModerationStatus::Pending
}

/// Ownership-only, no admin override: admins moderate and delete, they do
/// not rewrite other people's words.
pub fn can_edit(actor: Actor, node: &NodeRef<'_>) -> bool {
    owns(actor, node) && is_editable(node)
}

pub fn can_delete(actor: Actor, node: &NodeRef<'_>) -> bool {
    actor.is_admin || owns(actor, node)
}

pub fn can_moderate(actor: Actor) -> bool {
    actor.is_admin
}

pub fn can_reply(node: &NodeRef<'_>) -> bool {
    node.open_to_replies()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::comment::model::Comment;

    fn actor() -> Actor {
        Actor { id: Uuid::new_v4(), is_admin: false }
    }

    fn comment_by(author: Actor, status: ModerationStatus) -> Comment {
        let mut comment = Comment::new(Uuid::new_v4(), author.id, "Fast shipping".into());
        comment.status = status;
        comment
    }

    #[test]
    fn owner_may_edit_only_while_pending() {
        let owner = actor();
        for (status, expected) in [
            (ModerationStatus::Pending, true),
            (ModerationStatus::Approved, false),
            (ModerationStatus::Rejected, false),
        ] {
            let comment = comment_by(owner, status);
            assert_eq!(can_edit(owner, &NodeRef::Root(&comment)), expected);
        }
    }

    #[test]
    fn non_owner_may_never_edit() {
        let owner = actor();
        let comment = comment_by(owner, ModerationStatus::Pending);
        let stranger = actor();
        let admin = Actor { id: Uuid::new_v4(), is_admin: true };
        assert!(!can_edit(stranger, &NodeRef::Root(&comment)));
        assert!(!can_edit(admin, &NodeRef::Root(&comment)), "no admin override on edits");
    }

    #[test]
    fn delete_is_owner_or_admin() {
        let owner = actor();
        let comment = comment_by(owner, ModerationStatus::Approved);
        let node = NodeRef::Root(&comment);
        assert!(can_delete(owner, &node));
        assert!(can_delete(Actor { id: Uuid::new_v4(), is_admin: true }, &node));
        assert!(!can_delete(actor(), &node));
    }

    #[test]
    fn only_admin_moderates() {
        assert!(can_moderate(Actor { id: Uuid::new_v4(), is_admin: true }));
        assert!(!can_moderate(actor()));
    }

    #[test]
    fn closed_node_refuses_replies() {
        let owner = actor();
        let mut comment = comment_by(owner, ModerationStatus::Approved);
        assert!(can_reply(&NodeRef::Root(&comment)));
        comment.open_to_replies = false;
        assert!(!can_reply(&NodeRef::Root(&comment)));
    }
}
