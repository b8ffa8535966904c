use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;
use crate::{
    db::DBClient,
    error::ServiceError,
    modules::comment::{
        model::{self, Comment, ModerationStatus, NodePatch, Reply},
        tree::{self, Locator},
    },
};

/// A root document together with the version it was read at. The version is
/// the optimistic-concurrency token every locator-scoped write is guarded by.
#[derive(Debug, Clone)]
pub struct StoredComment {
    pub comment: Comment,
    pub version: i64,
}

/// Durable storage of the comment tree, one document per root comment.
/// Mutations are compare-and-swap on the document version: a zero-row write
/// is surfaced as `Conflict`, never retried here.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_root(&self, comment: &Comment) -> Result<(), ServiceError>;
    async fn fetch_root(&self, root_id: Uuid) -> Result<Option<StoredComment>, ServiceError>;
    /// Direct root lookup first; only if that misses, a containment probe
    /// over embedded reply trees.
    async fn find_root_containing(&self, node_id: Uuid) -> Result<Option<StoredComment>, ServiceError>;
    async fn append_child(
        &self,
        locator: &Locator,
        expected_version: i64,
        reply: Reply,
    ) -> Result<(), ServiceError>;
    /// Returns false when the addressed node no longer exists.
    async fn mutate_node(
        &self,
        locator: &Locator,
        expected_version: i64,
        patch: NodePatch,
    ) -> Result<bool, ServiceError>;
    async fn delete_node(&self, locator: &Locator, expected_version: i64) -> Result<bool, ServiceError>;
    /// Most-recent-first roots for a product, optionally narrowed to one
    /// moderation status.
    async fn list_roots(
        &self,
        product_id: Uuid,
        status: Option<ModerationStatus>,
    ) -> Result<Vec<Comment>, ServiceError>;
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    doc: Json<Comment>,
    version: i64,
}

impl CommentRow {
    fn into_stored(self) -> StoredComment {
        StoredComment {
            comment: self.doc.0,
            version: self.version,
        }
    }
}

pub const CONCURRENT_UPDATE: &str = "The comment was modified concurrently, please retry.";

#[async_trait]
impl CommentStore for DBClient {
    async fn create_root(&self, comment: &Comment) -> Result<(), ServiceError> {
        model::validate_text(&comment.text)?;
        sqlx::query(
            r#"
                INSERT INTO product_comments (id, product_id, doc, version, created_at)
                VALUES ($1, $2, $3, 0, $4);
            "#,
        )
        .bind(comment.id)
        .bind(comment.product_id)
        .bind(Json(comment))
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_root(&self, root_id: Uuid) -> Result<Option<StoredComment>, ServiceError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
                SELECT doc, version FROM product_comments WHERE id = $1;
            "#,
        )
        .bind(root_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CommentRow::into_stored))
    }

    async fn find_root_containing(&self, node_id: Uuid) -> Result<Option<StoredComment>, ServiceError> {
        if let Some(stored) = self.fetch_root(node_id).await? {
            return Ok(Some(stored));
        }
        // Reply ids are not indexed on their own, so probe the embedded
        // trees. Node ids are uuids, safe to splice into the jsonpath.
        let path = format!(r#"$.** ? (@.id == "{}")"#, node_id);
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
                SELECT doc, version FROM product_comments
                WHERE jsonb_path_exists(doc, $1::jsonpath);
            "#,
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CommentRow::into_stored))
    }

    async fn append_child(
        &self,
        locator: &Locator,
        expected_version: i64,
        reply: Reply,
    ) -> Result<(), ServiceError> {
        let stored = self
            .fetch_root(locator.root_id())
            .await?
            .ok_or(ServiceError::NotFound("comment"))?;
        if stored.version != expected_version {
            return Err(ServiceError::Conflict(CONCURRENT_UPDATE));
        }
        let mut doc = stored.comment;
        let open = tree::node(&doc, locator.node_id())
            .ok_or(ServiceError::NotFound("comment"))?
            .open_to_replies();
        if !open {
            return Err(ServiceError::Conflict("This comment is closed to replies."));
        }
        if !tree::append_reply(&mut doc, locator.node_id(), reply) {
            return Err(ServiceError::NotFound("comment"));
        }
        self.swap_doc(&doc, expected_version).await
    }

    async fn mutate_node(
        &self,
        locator: &Locator,
        expected_version: i64,
        patch: NodePatch,
    ) -> Result<bool, ServiceError> {
        let Some(stored) = self.fetch_root(locator.root_id()).await? else {
            return Ok(false);
        };
        if stored.version != expected_version {
            return Err(ServiceError::Conflict(CONCURRENT_UPDATE));
        }
        let mut doc = stored.comment;
        if !tree::apply_patch(&mut doc, locator.node_id(), &patch) {
            return Ok(false);
        }
        self.swap_doc(&doc, expected_version).await?;
        Ok(true)
    }

    async fn delete_node(&self, locator: &Locator, expected_version: i64) -> Result<bool, ServiceError> {
        if locator.is_root() {
            let rows = sqlx::query(
                r#"
                    DELETE FROM product_comments WHERE id = $1 AND version = $2;
                "#,
            )
            .bind(locator.root_id())
            .bind(expected_version)
            .execute(&self.pool)
            .await?
            .rows_affected();
            return Ok(rows == 1);
        }
        let Some(stored) = self.fetch_root(locator.root_id()).await? else {
            return Ok(false);
        };
        if stored.version != expected_version {
            return Err(ServiceError::Conflict(CONCURRENT_UPDATE));
        }
        let mut doc = stored.comment;
        if !tree::remove_reply(&mut doc, locator.node_id()) {
            return Ok(false);
        }
        self.swap_doc(&doc, expected_version).await?;
        Ok(true)
    }

    async fn list_roots(
        &self,
        product_id: Uuid,
        status: Option<ModerationStatus>,
    ) -> Result<Vec<Comment>, ServiceError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                        SELECT doc, version FROM product_comments
                        WHERE product_id = $1 AND doc->>'status' = $2
                        ORDER BY created_at DESC;
                    "#,
                )
                .bind(product_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                        SELECT doc, version FROM product_comments
                        WHERE product_id = $1
                        ORDER BY created_at DESC;
                    "#,
                )
                .bind(product_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(|row| row.doc.0).collect())
    }
}

impl DBClient {
    async fn swap_doc(&self, doc: &Comment, expected_version: i64) -> Result<(), ServiceError> {
        let rows = sqlx::query(
            r#"
                UPDATE product_comments SET doc = $1, version = version + 1
                WHERE id = $2 AND version = $3;
            "#,
        )
        .bind(Json(doc))
        .bind(doc.id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if rows == 0 {
            return Err(ServiceError::Conflict(CONCURRENT_UPDATE));
        }
        Ok(())
    }
}
