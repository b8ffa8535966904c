pub mod auth;
use serde::Serialize;
use crate::modules::user::model::User;

#[derive(Serialize, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

/// Identity for read paths that serve anonymous visitors too.
#[derive(Clone)]
pub struct Viewer(pub Option<User>);
