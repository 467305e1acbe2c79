//! Topic endpoints

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
    models::{AuthenticatedUser, Topic, TopicInput},
    state::AppState,
};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Topic>>> {
    Ok(Json(state.topics.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Json(payload), _): WithRejection<Json<TopicInput>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let topic = state.topics.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<TopicInput>, ApiError>,
) -> ApiResult<Json<Topic>> {
    Ok(Json(state.topics.update(&identity, id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Topic>> {
    Ok(Json(state.topics.delete(&identity, id).await?))
}
