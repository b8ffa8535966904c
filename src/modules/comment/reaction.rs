use uuid::Uuid;
use crate::{
    error::ServiceError,
    modules::comment::{
        dto::ReactionSummary,
        model::{NodePatch, ReactionSets},
        store::CommentStore,
        tree,
    },
};

#[derive(Clone, Copy)]
enum Reaction {
    Like,
    Dislike,
}

pub async fn toggle_like<S>(
    store: &S,
    node_id: Uuid,
    user_id: Uuid,
) -> Result<ReactionSummary, ServiceError>
where
    S: CommentStore + ?Sized,
{
    toggle(store, node_id, user_id, Reaction::Like).await
}

pub async fn toggle_dislike<S>(
    store: &S,
    node_id: Uuid,
    user_id: Uuid,
) -> Result<ReactionSummary, ServiceError>
where
    S: CommentStore + ?Sized,
{
    toggle(store, node_id, user_id, Reaction::Dislike).await
}

/// Exactly one of {liked, disliked, neither} per user and node: setting one
/// side clears the other, setting the same side again clears it. The new
/// sets are computed from the snapshot the version token came from, so the
/// guarded write cannot interleave with a concurrent toggle — a lost race
/// surfaces as `Conflict` instead of a broken invariant.
async fn toggle<S>(
    store: &S,
    node_id: Uuid,
    user_id: Uuid,
    reaction: Reaction,
) -> Result<ReactionSummary, ServiceError>
where
    S: CommentStore + ?Sized,
{
    let resolved = tree::resolve(store, node_id).await?;
    let node = tree::node(&resolved.root, node_id).ok_or(ServiceError::NotFound("comment"))?;
    let mut likes = node.likes().clone();
    let mut dislikes = node.dislikes().clone();
    match reaction {
        Reaction::Like => {
            if !likes.remove(&user_id) {
                likes.insert(user_id);
                dislikes.remove(&user_id);
            }
        }
        Reaction::Dislike => {
            if !dislikes.remove(&user_id) {
                dislikes.insert(user_id);
                likes.remove(&user_id);
            }
        }
    }
    let summary = ReactionSummary {
        likes_count: likes.len(),
        dislikes_count: dislikes.len(),
        user_liked: likes.contains(&user_id),
        user_disliked: dislikes.contains(&user_id),
    };
    let patch = NodePatch {
        reactions: Some(ReactionSets { likes, dislikes }),
        ..NodePatch::default()
    };
    if !store
        .mutate_node(&resolved.locator, resolved.version, patch)
        .await?
    {
        return Err(ServiceError::NotFound("comment"));
    }
    Ok(summary)
}
