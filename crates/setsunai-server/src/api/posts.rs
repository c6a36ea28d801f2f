//! Sealed post endpoints
//!
//! Bodies carry envelopes only. Ownership is checked against the caller's
//! user id before any change.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use setsunai_core::{Envelope, Post};

use super::{ApiError, AppState, UserId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub encrypted_content: String,
    pub iv: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub id: String,
    pub encrypted_content: String,
    pub iv: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: Post,
}

fn envelope(encrypted_content: String, iv: String) -> Result<Envelope, ApiError> {
    if encrypted_content.is_empty() || iv.is_empty() {
        return Err(ApiError::invalid_post());
    }
    Ok(Envelope {
        ciphertext: encrypted_content,
        iv,
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> Result<Json<PostList>, ApiError> {
    let posts = state.notes.list_sealed(&user_id).await?;
    Ok(Json(PostList { posts }))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::invalid_post())?;
    let envelope = envelope(request.encrypted_content, request.iv)?;

    let post = state.notes.create_sealed(&user_id, envelope).await?;
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    body: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::invalid_post())?;
    let id = Uuid::parse_str(&request.id).map_err(|_| ApiError::invalid_post())?;
    let envelope = envelope(request.encrypted_content, request.iv)?;

    let post = state.notes.replace_sealed(&user_id, id, envelope).await?;
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    query: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = query.map_err(|_| ApiError::bad_request("Post ID required"))?;
    let id = params
        .id
        .ok_or_else(|| ApiError::bad_request("Post ID required"))?;
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::bad_request("Post ID required"))?;

    state.notes.delete(&user_id, id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
