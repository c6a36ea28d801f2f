//! HTTP API for PIN records and sealed posts
//!
//! The identity provider sits in front of this service and forwards the
//! authenticated user id in the `x-user-id` header.

mod auth;
mod error;
mod posts;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use setsunai_core::{NoteManager, NoteStore};

pub use error::ApiError;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared state for HTTP handlers
pub struct AppState {
    storage: Arc<dyn NoteStore>,
    notes: NoteManager,
}

impl AppState {
    pub fn new(storage: Arc<dyn NoteStore>) -> Self {
        Self {
            notes: NoteManager::new(storage.clone()),
            storage,
        }
    }
}

/// Authenticated user id taken from the request
pub struct UserId(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| UserId(id.to_string()))
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// Build the API router
pub fn router(storage: Arc<dyn NoteStore>) -> Router {
    let state = Arc::new(AppState::new(storage));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/user-status", get(auth::user_status))
        .route("/api/auth/setup-pin", post(auth::setup_pin))
        .route("/api/auth/verify-pin", post(auth::verify_pin))
        .route(
            "/api/posts",
            get(posts::list)
                .post(posts::create)
                .put(posts::update)
                .delete(posts::delete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}
