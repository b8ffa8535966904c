use uuid::Uuid;
use crate::{
    error::ServiceError,
    modules::{
        comment::{
            gate,
            model::{validate_text, Comment, Reply},
            store::CommentStore,
            tree,
        },
        product::model::ProductRepository,
    },
};

/// Creates a root comment under a product. New roots are open to replies,
/// and the product keeps a back-reference to the new id.
pub async fn add_root_comment<S, P>(
    store: &S,
    products: &P,
    product_id: Uuid,
    author_id: Uuid,
    text: String,
) -> Result<Comment, ServiceError>
where
    S: CommentStore + ?Sized,
    P: ProductRepository + ?Sized,
{
    validate_text(&text)?;
    if !products.product_exists(product_id).await? {
        return Err(ServiceError::NotFound("product"));
    }
    let comment = Comment::new(product_id, author_id, text);
    store.create_root(&comment).await?;
    products.attach_comment(product_id, comment.id).await?;
    tracing::info!(comment_id = %comment.id, product_id = %product_id, "root comment created");
    Ok(comment)
}

/// Creates a reply under any node of the tree. The target's locator supplies
/// the lineage: replies to the root carry no `parent_reply_id`, replies to a
/// reply carry the target's id.
pub async fn add_reply<S>(
    store: &S,
    target_node_id: Uuid,
    author_id: Uuid,
    text: String,
) -> Result<Reply, ServiceError>
where
    S: CommentStore + ?Sized,
{
    validate_text(&text)?;
    let resolved = tree::resolve(store, target_node_id).await?;
    let target = tree::node(&resolved.root, target_node_id)
        .ok_or(ServiceError::NotFound("comment"))?;
    if !gate::can_reply(&target) {
        return Err(ServiceError::Conflict("This comment is closed to replies."));
    }
    let parent_reply_id = (!resolved.locator.is_root()).then_some(target_node_id);
    let reply = Reply::new(
        resolved.root.product_id,
        author_id,
        text,
        resolved.root.id,
        parent_reply_id,
    );
    store
        .append_child(&resolved.locator, resolved.version, reply.clone())
        .await?;
    tracing::info!(reply_id = %reply.id, root_id = %resolved.root.id, "reply created");
    Ok(reply)
}
