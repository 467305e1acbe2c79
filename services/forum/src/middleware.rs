//! Identity middleware
//!
//! Protected routes run behind [`require_identity`], which accepts a token from
//! an `Authorization: Bearer` header or, failing that, the `access_token`
//! cookie. On success the verified [`AuthenticatedUser`] is stored in the
//! request extensions; handlers never read identity from the request body.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use tracing::debug;

use crate::error::ApiError;
use crate::models::AuthenticatedUser;
use crate::services::ServiceError;
use crate::state::AppState;

/// Cookie the web client stores its token in
pub const TOKEN_COOKIE: &str = "access_token";

/// Find the caller's token, header first
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Reject the request unless it carries a valid token
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers()).ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt_service.validate(&token).map_err(|e| {
        debug!(error = %e, path = %req.uri().path(), "Token rejected");
        ApiError::from(ServiceError::from(e))
    })?;

    req.extensions_mut().insert(AuthenticatedUser::from(claims));

    Ok(next.run(req).await)
}
