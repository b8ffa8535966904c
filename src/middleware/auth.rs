use std::sync::Arc;
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::IntoResponse,
    Extension
};
use axum_extra::extract::cookie::CookieJar;
use crate::{
    modules::user::model::UserRepository,
    error::{ErrorMessage, HttpError},
    utils::jwt,
    AppState,
    middleware::{AuthenticatedUser, Viewer}
};

fn bearer_or_cookie(cookie_jar: &CookieJar, req: &Request) -> Option<String> {
    let value = cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .map(|auth_value| auth_value.to_owned())
        })?;
    if value.trim().is_empty() {
        return None;
    }
    if value.starts_with("Bearer ") {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 2 || parts[0] != "Bearer" {
            return None;
        }
        return Some(parts[1].to_string());
    }
    Some(value)
}

pub async fn auth_token(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError<()>> {
    let token = bearer_or_cookie(&cookie_jar, &req).ok_or(
        HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string(), None)
    )?;
    let user_id = jwt::parse_token(token, app_state.env.jwt_secret.as_bytes())?;
    let user = app_state.db_client.get_user_by_id(&user_id).await
        .map_err(|_| {
            HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string(), None)
        })?
        .ok_or_else(|| {
            HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string(), None)
        })?;
    req.extensions_mut().insert(AuthenticatedUser {
        user,
    });
    Ok(next.run(req).await)
}

/// Same token handling as `auth_token`, but an absent or invalid identity
/// degrades to an anonymous `Viewer` instead of rejecting the request.
pub async fn auth_token_view(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError<()>> {
    let mut viewer = Viewer(None);
    if let Some(token) = bearer_or_cookie(&cookie_jar, &req) {
        if let Ok(user_id) = jwt::parse_token(token, app_state.env.jwt_secret.as_bytes()) {
            if let Ok(user) = app_state.db_client.get_user_by_id(&user_id).await {
                viewer = Viewer(user);
            }
        }
    }
    req.extensions_mut().insert(viewer);
    Ok(next.run(req).await)
}
