//! Post endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{AuthenticatedUser, Post, PostInput, PostUpdate},
    state::AppState,
};

/// Posts of a topic
pub async fn list_by_topic(
    State(state): State<AppState>,
    WithRejection(Path(topic_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.posts.list_by_topic(topic_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Json(payload), _): WithRejection<Json<PostInput>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let post = state.posts.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<PostUpdate>, ApiError>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.update(&identity, id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.delete(&identity, id).await?))
}
