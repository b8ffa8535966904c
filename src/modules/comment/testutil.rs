use std::collections::HashMap;
use std::sync::RwLock;
use async_trait::async_trait;
use uuid::Uuid;
use crate::{
    error::ServiceError,
    modules::{
        comment::{
            model::{self, Comment, ModerationStatus, NodePatch, Reply},
            store::{CommentStore, StoredComment, CONCURRENT_UPDATE},
            tree::{self, Locator},
        },
        product::model::ProductRepository,
        user::model::{Role, User, UserDisplay, UserRepository},
    },
};

/// In-memory document store with the same compare-and-swap semantics as the
/// Postgres implementation. Every service-level test runs against it.
#[derive(Default)]
pub struct MemoryStore {
    comments: RwLock<HashMap<Uuid, (Comment, i64)>>,
    products: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_product(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.products.write().unwrap().insert(id, Vec::new());
        id
    }

    pub fn seed_user(&self, name: &str, role: Role) -> User {
        let handle = name.to_lowercase().replace(' ', ".");
        let user = User {
            id: Uuid::new_v4(),
            role,
            name: name.to_string(),
            email: format!("{handle}@example.com"),
            password: "argon2-hash".to_string(),
            avatar_url: Some(format!("https://cdn.example.com/avatars/{handle}.png")),
            created_at: None,
            updated_at: None,
        };
        self.users.write().unwrap().insert(user.id, user.clone());
        user
    }

    pub fn product_comment_ids(&self, product_id: Uuid) -> Vec<Uuid> {
        self.products
            .read()
            .unwrap()
            .get(&product_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_root(&self, comment: &Comment) -> Result<(), ServiceError> {
        model::validate_text(&comment.text)?;
        self.comments
            .write()
            .unwrap()
            .insert(comment.id, (comment.clone(), 0));
        Ok(())
    }

    async fn fetch_root(&self, root_id: Uuid) -> Result<Option<StoredComment>, ServiceError> {
        Ok(self.comments.read().unwrap().get(&root_id).map(|(comment, version)| {
            StoredComment { comment: comment.clone(), version: *version }
        }))
    }

    async fn find_root_containing(&self, node_id: Uuid) -> Result<Option<StoredComment>, ServiceError> {
        let comments = self.comments.read().unwrap();
        if let Some((comment, version)) = comments.get(&node_id) {
            return Ok(Some(StoredComment { comment: comment.clone(), version: *version }));
        }
        for (comment, version) in comments.values() {
            if tree::locate(comment, node_id).is_some() {
                return Ok(Some(StoredComment { comment: comment.clone(), version: *version }));
            }
        }
        Ok(None)
    }

    async fn append_child(
        &self,
        locator: &Locator,
        expected_version: i64,
        reply: Reply,
    ) -> Result<(), ServiceError> {
        let mut comments = self.comments.write().unwrap();
        let entry = comments
            .get_mut(&locator.root_id())
            .ok_or(ServiceError::NotFound("comment"))?;
        if entry.1 != expected_version {
            return Err(ServiceError::Conflict(CONCURRENT_UPDATE));
        }
        let open = tree::node(&entry.0, locator.node_id())
            .ok_or(ServiceError::NotFound("comment"))?
            .open_to_replies();
        if !open {
            return Err(ServiceError::Conflict("This comment is closed to replies."));
        }
        if !tree::append_reply(&mut entry.0, locator.node_id(), reply) {
            return Err(ServiceError::NotFound("comment"));
        }
        entry.1 += 1;
        Ok(())
    }

    async fn mutate_node(
        &self,
        locator: &Locator,
        expected_version: i64,
        patch: NodePatch,
    ) -> Result<bool, ServiceError> {
        let mut comments = self.comments.write().unwrap();
        let Some(entry) = comments.get_mut(&locator.root_id()) else {
            return Ok(false);
        };
        if entry.1 != expected_version {
            return Err(ServiceError::Conflict(CONCURRENT_UPDATE));
        }
        if !tree::apply_patch(&mut entry.0, locator.node_id(), &patch) {
            return Ok(false);
        }
        entry.1 += 1;
        Ok(true)
    }

    async fn delete_node(&self, locator: &Locator, expected_version: i64) -> Result<bool, ServiceError> {
        let mut comments = self.comments.write().unwrap();
        if locator.is_root() {
            let Some(entry) = comments.get(&locator.root_id()) else {
                return Ok(false);
            };
            if entry.1 != expected_version {
                return Ok(false);
            }
            comments.remove(&locator.root_id());
            return Ok(true);
        }
        let Some(entry) = comments.get_mut(&locator.root_id()) else {
            return Ok(false);
        };
        if entry.1 != expected_version {
            return Err(ServiceError::Conflict(CONCURRENT_UPDATE));
        }
        if !tree::remove_reply(&mut entry.0, locator.node_id()) {
            return Ok(false);
        }
        entry.1 += 1;
        Ok(true)
    }

    async fn list_roots(
        &self,
        product_id: Uuid,
        status: Option<ModerationStatus>,
    ) -> Result<Vec<Comment>, ServiceError> {
        let comments = self.comments.read().unwrap();
        let mut roots: Vec<Comment> = comments
            .values()
            .filter(|(comment, _)| comment.product_id == product_id)
            .filter(|(comment, _)| status.is_none_or(|s| comment.status == s))
            .map(|(comment, _)| comment.clone())
            .collect();
        roots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(roots)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.products.read().unwrap().contains_key(&product_id))
    }
    async fn attach_comment(&self, product_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError> {
        if let Some(ids) = self.products.write().unwrap().get_mut(&product_id) {
            ids.push(comment_id);
        }
        Ok(())
    }
    async fn detach_comment(&self, product_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError> {
        if let Some(ids) = self.products.write().unwrap().get_mut(&product_id) {
            ids.retain(|id| *id != comment_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.users.read().unwrap().get(user_id).cloned())
    }
    async fn resolve_display(&self, user_id: &Uuid) -> Result<Option<UserDisplay>, ServiceError> {
        Ok(self.users.read().unwrap().get(user_id).map(|user| UserDisplay {
            id: user.id,
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        }))
    }
}
