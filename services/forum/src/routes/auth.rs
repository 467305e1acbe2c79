//! Registration and login

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    middleware::TOKEN_COOKIE,
    services::ServiceError,
    state::AppState,
};

/// Body of both `/register` and `/login`
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

fn token_cookie(token: &str, max_age: u64) -> String {
    format!("{TOKEN_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}")
}

/// Create an account
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CredentialsRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .credentials
        .register(&payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Exchange a username and password for an identity token
///
/// Unknown usernames and wrong passwords get the same response. Failures are
/// counted per username and lock it out once the limit is reached.
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CredentialsRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let key = payload.username.as_str();

    if state.login_throttle.is_locked(key).await {
        warn!(username = %key, "Login refused while locked out");
        return Err(ServiceError::TooManyAttempts.into());
    }

    let profile = match state
        .credentials
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(profile) => profile,
        Err(ServiceError::NotFound(_) | ServiceError::InvalidCredentials) => {
            state.login_throttle.record_failure(key).await;
            info!(username = %key, "Failed login attempt");
            return Err(ApiError::InvalidLogin);
        }
        Err(e) => return Err(e.into()),
    };

    state.login_throttle.clear(key).await;

    let token = state
        .jwt_service
        .issue(profile.id, &profile.username)
        .map_err(ServiceError::from)?;
    let expires_in = state.jwt_service.token_expiry();

    info!(user_id = %profile.id, "User logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, token_cookie(&token, expires_in))]),
        Json(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }),
    ))
}
