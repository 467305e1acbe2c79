//! User endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    models::{AuthenticatedUser, UserProfile},
    state::AppState,
};

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Profile of the caller
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.users.fetch_by_id(identity.user_id).await?))
}

/// Public profile of a user
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(username), _): WithRejection<Path<String>, ApiError>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.users.fetch_by_username(&username).await?))
}

/// Change the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
    WithRejection(Json(payload), _): WithRejection<Json<ChangePasswordRequest>, ApiError>,
) -> ApiResult<StatusCode> {
    state
        .users
        .change_password(&identity, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
