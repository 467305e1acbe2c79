//! Forum routes

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{middleware::require_identity, state::AppState};

pub mod auth;
pub mod comments;
pub mod posts;
pub mod topics;
pub mod users;

/// Create the router for the forum service
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let protected_routes = Router::new()
        .route("/users/me", get(users::me))
        .route("/users/:username", get(users::get_user))
        .route("/users/me/password", put(users::change_password))
        .route("/topics", get(topics::list).post(topics::create))
        .route("/topics/:id", put(topics::update).delete(topics::delete))
        .route("/topics/:id/posts", get(posts::list_by_topic))
        .route("/posts", post(posts::create))
        .route("/posts/:id", put(posts::update).delete(posts::delete))
        .route("/posts/:id/comments", get(comments::list_by_post))
        .route("/comments", post(comments::create))
        .route("/comments/:id", put(comments::update).delete(comments::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.storage.is_healthy().await {
        (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "up" })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "down" })),
        )
    }
}
