use uuid::Uuid;
use crate::{
    error::ServiceError,
    modules::{
        comment::{
            dto::NodeRecord,
            gate::{self, Actor},
            model::{validate_text, NodePatch},
            store::CommentStore,
            tree::{self, NodeRef},
        },
        product::model::ProductRepository,
    },
};

/// Rewords a node. Ownership is required and only Pending text is still
/// editable; the distinction matters for the error kind the caller sees.
pub async fn edit_text<S>(
    store: &S,
    node_id: Uuid,
    actor: Actor,
    text: String,
) -> Result<NodeRecord, ServiceError>
where
    S: CommentStore + ?Sized,
{
    validate_text(&text)?;
    let resolved = tree::resolve(store, node_id).await?;
    let node = tree::node(&resolved.root, node_id).ok_or(ServiceError::NotFound("comment"))?;
    if !gate::owns(actor, &node) {
        return Err(ServiceError::Forbidden("Only the author may edit this comment."));
    }
    if !gate::is_editable(&node) {
        return Err(ServiceError::Conflict(
            "This comment has already been moderated and can no longer be edited.",
        ));
    }
    let patch = NodePatch { text: Some(text), ..NodePatch::default() };
    if !store
        .mutate_node(&resolved.locator, resolved.version, patch.clone())
        .await?
    {
        return Err(ServiceError::NotFound("comment"));
    }
    let mut root = resolved.root;
    tree::apply_patch(&mut root, node_id, &patch);
    let record = match tree::node(&root, node_id).ok_or(ServiceError::NotFound("comment"))? {
        NodeRef::Root(comment) => NodeRecord::from(comment),
        NodeRef::Reply(reply) => NodeRecord::from(reply),
    };
    Ok(record)
}

/// Deletes a node and its whole subtree. A deleted root takes its document
/// with it and is detached from the owning product's comment list.
pub async fn delete_node<S, P>(
    store: &S,
    products: &P,
    node_id: Uuid,
    actor: Actor,
) -> Result<(), ServiceError>
where
    S: CommentStore + ?Sized,
    P: ProductRepository + ?Sized,
{
    let resolved = tree::resolve(store, node_id).await?;
    let node = tree::node(&resolved.root, node_id).ok_or(ServiceError::NotFound("comment"))?;
    if !gate::can_delete(actor, &node) {
        return Err(ServiceError::Forbidden(
            "Only the author or an admin may delete this comment.",
        ));
    }
    if !store.delete_node(&resolved.locator, resolved.version).await? {
        return Err(ServiceError::NotFound("comment"));
    }
    if resolved.locator.is_root() {
        products
            .detach_comment(resolved.root.product_id, resolved.root.id)
            .await?;
    }
    tracing::info!(node_id = %node_id, root_id = %resolved.root.id, "comment deleted");
    Ok(())
}
