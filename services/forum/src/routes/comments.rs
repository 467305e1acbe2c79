//! Comment endpoints

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
    models::{AuthenticatedUser, Comment, CommentInput, CommentUpdate},
    state::AppState,
};

/// Comments of a post
pub async fn list_by_post(
    State(state): State<AppState>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.comments.list_by_post(post_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CommentInput>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let comment = state.comments.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<CommentUpdate>, ApiError>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(state.comments.update(&identity, id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(state.comments.delete(&identity, id).await?))
}
