use std::sync::Arc;
use axum::{
    Extension, Router, middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use uuid::Uuid;
use validator::Validate;
use crate::{
    AppState,
    dto::{HttpResult, SuccessResponse},
    error::{map_service_error, BodyParser, FieldError, PathParser, ServiceError},
    middleware::{auth::{auth_token, auth_token_view}, AuthenticatedUser, Viewer},
    modules::comment::{
        compose,
        dto::{CommentBody, NodeRecord, StatusBody},
        edit,
        gate::Actor,
        model::ModerationStatus,
        moderation, reaction,
    },
};

pub fn product_comment_router() -> Router {
    Router::new()
        .route("/{product_id}/comments", post(comment_create).layer(middleware::from_fn(auth_token)))
        .route("/{product_id}/comments", get(comment_list).layer(middleware::from_fn(auth_token_view)))
}

pub fn comment_router() -> Router {
    Router::new()
        .route("/{node_id}/replies", post(reply_create))
        .route("/{node_id}", put(comment_edit))
        .route("/{node_id}", delete(comment_delete))
        .route("/{node_id}/like", post(comment_like))
        .route("/{node_id}/dislike", post(comment_dislike))
        .route("/{node_id}/status", put(comment_set_status))
        .layer(middleware::from_fn(auth_token))
}

async fn comment_create(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user_auth): Extension<AuthenticatedUser>,
    PathParser(product_id): PathParser<Uuid>,
    BodyParser(body): BodyParser<CommentBody>,
) -> HttpResult<impl IntoResponse> {
    body.validate().map_err(FieldError::populate_errors)?;
    let comment = compose::add_root_comment(
        &app_state.db_client,
        &app_state.db_client,
        product_id,
        user_auth.user.id,
        body.text,
    )
    .await
    .map_err(map_service_error)?;
    Ok(SuccessResponse::new("Comment created.", Some(NodeRecord::from(&comment))))
}

async fn comment_list(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    PathParser(product_id): PathParser<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let actor = viewer.0.as_ref().map(Actor::from);
    let views = moderation::list_for_product(
        &app_state.db_client,
        &app_state.db_client,
        product_id,
        actor,
    )
    .await
    .map_err(map_service_error)?;
    Ok(SuccessResponse::new("Getting comment list data.", Some(views)))
}

async fn reply_create(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user_auth): Extension<AuthenticatedUser>,
    PathParser(node_id): PathParser<Uuid>,
    BodyParser(body): BodyParser<CommentBody>,
) -> HttpResult<impl IntoResponse> {
    body.validate().map_err(FieldError::populate_errors)?;
    let reply = compose::add_reply(&app_state.db_client, node_id, user_auth.user.id, body.text)
        .await
        .map_err(map_service_error)?;
    Ok(SuccessResponse::new("Reply created.", Some(NodeRecord::from(&reply))))
}

async fn comment_edit(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user_auth): Extension<AuthenticatedUser>,
    PathParser(node_id): PathParser<Uuid>,
    BodyParser(body): BodyParser<CommentBody>,
) -> HttpResult<impl IntoResponse> {
    body.validate().map_err(FieldError::populate_errors)?;
    let actor = Actor::from(&user_auth.user);
    let record = edit::edit_text(&app_state.db_client, node_id, actor, body.text)
        .await
        .map_err(map_service_error)?;
    Ok(SuccessResponse::new("Comment updated.", Some(record)))
}

async fn comment_delete(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user_auth): Extension<AuthenticatedUser>,
    PathParser(node_id): PathParser<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let actor = Actor::from(&user_auth.user);
    edit::delete_node(&app_state.db_client, &app_state.db_client, node_id, actor)
        .await
        .map_err(map_service_error)?;
    Ok(SuccessResponse::<()>::new("Comment deleted.", None))
}

async fn comment_like(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user_auth): Extension<AuthenticatedUser>,
    PathParser(node_id): PathParser<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let summary = reaction::toggle_like(&app_state.db_client, node_id, user_auth.user.id)
        .await
        .map_err(map_service_error)?;
    Ok(SuccessResponse::new("Reaction updated.", Some(summary)))
}

async fn comment_dislike(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user_auth): Extension<AuthenticatedUser>,
    PathParser(node_id): PathParser<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let summary = reaction::toggle_dislike(&app_state.db_client, node_id, user_auth.user.id)
        .await
        .map_err(map_service_error)?;
    Ok(SuccessResponse::new("Reaction updated.", Some(summary)))
}

async fn comment_set_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user_auth): Extension<AuthenticatedUser>,
    PathParser(node_id): PathParser<Uuid>,
    BodyParser(body): BodyParser<StatusBody>,
) -> HttpResult<impl IntoResponse> {
    let new_status = ModerationStatus::parse(&body.status).ok_or_else(|| {
        map_service_error(ServiceError::Validation(
            "Status must be one of rejected, pending, approved.".to_string(),
        ))
    })?;
    let actor = Actor::from(&user_auth.user);
    let record = moderation::set_status(&app_state.db_client, node_id, actor, new_status)
        .await
        .map_err(map_service_error)?;
    Ok(SuccessResponse::new("Moderation status updated.", Some(record)))
}
