//! HTTP projection of service errors

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::ServiceError;

/// Error type returned by every handler
#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable identity token on a protected route
    #[error("Unauthorized")]
    Unauthorized,

    /// Login failure, deliberately silent about which half was wrong
    #[error("invalid username or password")]
    InvalidLogin,

    /// Malformed path or body
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidLogin => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::DuplicateUsername | ServiceError::AlreadyExists(_) => {
                    StatusCode::CONFLICT
                }
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::InvalidCredentials
                | ServiceError::InvalidToken
                | ServiceError::ExpiredToken => StatusCode::UNAUTHORIZED,
                ServiceError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                ServiceError::Storage(_) | ServiceError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Type alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::Entity;
    use axum::body::to_bytes;
    use common::DatabaseError;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let (status, body) = render(ServiceError::AlreadyExists(Entity::Topic).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "topic already exists");

        let (status, body) = render(ServiceError::NotFound(Entity::Post).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "post not found");

        let (status, _) = render(ServiceError::TooManyAttempts.into()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _) = render(ServiceError::ExpiredToken.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_requests_use_the_error_body() {
        let (status, body) = render(ApiError::BadRequest("missing field `name`".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing field `name`");
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let storage = ServiceError::Storage(DatabaseError::Query(sqlx::Error::Protocol(
            "relation \"topics\" does not exist".to_string(),
        )));

        let (status, body) = render(storage.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
