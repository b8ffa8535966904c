use async_trait::async_trait;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use crate::{db::DBClient, error::ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

#[derive(Debug, Deserialize, Serialize, FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Display fields the comment views embed for each author.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserDisplay {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, ServiceError>;
    async fn resolve_display(&self, user_id: &Uuid) -> Result<Option<UserDisplay>, ServiceError>;
}

#[async_trait]
impl UserRepository for DBClient {
    async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            r#"
                SELECT * FROM users WHERE id = $1;
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
    async fn resolve_display(&self, user_id: &Uuid) -> Result<Option<UserDisplay>, ServiceError> {
        let display = sqlx::query_as::<_, UserDisplay>(
            r#"
                SELECT id, name, avatar_url FROM users WHERE id = $1;
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(display)
    }
}
