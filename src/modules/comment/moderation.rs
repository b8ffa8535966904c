use std::collections::HashMap;
use uuid::Uuid;
use crate::{
    error::ServiceError,
    modules::{
        comment::{
            dto::{CommentView, NodeRecord, ReplyView},
            gate::{self, Actor},
            model::{Comment, ModerationStatus, NodePatch, Reply},
            store::CommentStore,
            tree::{self, NodeRef},
        },
        user::model::{UserDisplay, UserRepository},
    },
};

/// Flat status assignment, admin only. Any status is reachable from any
/// status; there is no transition graph.
pub async fn set_status<S>(
    store: &S,
    node_id: Uuid,
    actor: Actor,
    new_status: ModerationStatus,
) -> Result<NodeRecord, ServiceError>
where
    S: CommentStore + ?Sized,
{
    if !gate::can_moderate(actor) {
        return Err(ServiceError::Forbidden("Only admins may moderate comments."));
    }
    let resolved = tree::resolve(store, node_id).await?;
    let patch = NodePatch { status: Some(new_status), ..NodePatch::default() };
    if !store
        .mutate_node(&resolved.locator, resolved.version, patch.clone())
        .await?
    {
        return Err(ServiceError::NotFound("comment"));
    }
    tracing::info!(node_id = %node_id, status = new_status.as_str(), "moderation status changed");
    let mut root = resolved.root;
    tree::apply_patch(&mut root, node_id, &patch);
    let record = match tree::node(&root, node_id).ok_or(ServiceError::NotFound("comment"))? {
        NodeRef::Root(comment) => NodeRecord::from(comment),
        NodeRef::Reply(reply) => NodeRecord::from(reply),
    };
    Ok(record)
}

/// Listing for a viewer: admins see every status, everyone else only
/// Approved nodes, at every depth. Author display fields are resolved once
/// per distinct author; reaction flags are relative to the viewer.
pub async fn list_for_product<S, U>(
    store: &S,
    users: &U,
    product_id: Uuid,
    viewer: Option<Actor>,
) -> Result<Vec<CommentView>, ServiceError>
where
    S: CommentStore + ?Sized,
    U: UserRepository + ?Sized,
{
    let is_admin = viewer.is_some_and(|v| v.is_admin);
    let filter = if is_admin { None } else { Some(ModerationStatus::Approved) };
    let roots = store.list_roots(product_id, filter).await?;

    let mut displays: HashMap<Uuid, UserDisplay> = HashMap::new();
    for root in &roots {
        for author_id in tree::author_ids(root) {
            if displays.contains_key(&author_id) {
                continue;
            }
            if let Some(display) = users.resolve_display(&author_id).await? {
                displays.insert(author_id, display);
            }
        }
    }

    let viewer_id = viewer.map(|v| v.id);
    Ok(roots
        .iter()
        .map(|root| comment_view(root, &displays, viewer_id, is_admin))
        .collect())
}

fn display_for(displays: &HashMap<Uuid, UserDisplay>, author_id: Uuid) -> UserDisplay {
    displays.get(&author_id).cloned().unwrap_or(UserDisplay {
        id: author_id,
        name: "Deleted user".to_string(),
        avatar_url: None,
    })
}

fn comment_view(
    root: &Comment,
    displays: &HashMap<Uuid, UserDisplay>,
    viewer_id: Option<Uuid>,
    include_all: bool,
) -> CommentView {
    CommentView {
        id: root.id,
        product_id: root.product_id,
        author: display_for(displays, root.author_id),
        text: root.text.clone(),
        status: root.status,
        open_to_replies: root.open_to_replies,
        likes_count: root.likes.len(),
        dislikes_count: root.dislikes.len(),
        viewer_liked: viewer_id.is_some_and(|id| root.likes.contains(&id)),
        viewer_disliked: viewer_id.is_some_and(|id| root.dislikes.contains(&id)),
        created_at: root.created_at,
        replies: reply_views(&root.replies, displays, viewer_id, include_all),
    }
}

fn reply_views(
    replies: &[Reply],
    displays: &HashMap<Uuid, UserDisplay>,
    viewer_id: Option<Uuid>,
    include_all: bool,
) -> Vec<ReplyView> {
    replies
        .iter()
        .filter(|reply| include_all || reply.status == ModerationStatus::Approved)
        .map(|reply| ReplyView {
            id: reply.id,
            parent_comment_id: reply.parent_comment_id,
            parent_reply_id: reply.parent_reply_id,
            author: display_for(displays, reply.author_id),
            text: reply.text.clone(),
            status: reply.status,
            open_to_replies: reply.open_to_replies,
            likes_count: reply.likes.len(),
            dislikes_count: reply.dislikes.len(),
            viewer_liked: viewer_id.is_some_and(|id| reply.likes.contains(&id)),
            viewer_disliked: viewer_id.is_some_and(|id| reply.dislikes.contains(&id)),
            created_at: reply.created_at,
            children: reply_views(&reply.children, displays, viewer_id, include_all),
        })
        .collect()
}
