use async_trait::async_trait;
use uuid::Uuid;
use crate::{db::DBClient, error::ServiceError};

/// The comment engine's view of the product catalog: an existence check and
/// the back-reference list of root comment ids. Product management itself
/// lives elsewhere.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, ServiceError>;
    async fn attach_comment(&self, product_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError>;
    async fn detach_comment(&self, product_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError>;
}

#[async_trait]
impl ProductRepository for DBClient {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, ServiceError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
                SELECT EXISTS (SELECT 1 FROM products WHERE id = $1);
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
    async fn attach_comment(&self, product_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
                UPDATE products SET comment_ids = array_append(comment_ids, $2)
                WHERE id = $1;
            "#,
        )
        .bind(product_id)
        .bind(comment_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
    async fn detach_comment(&self, product_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
                UPDATE products SET comment_ids = array_remove(comment_ids, $2)
                WHERE id = $1;
            "#,
        )
        .bind(product_id)
        .bind(comment_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
