//! PIN setup and verification endpoints
//!
//! Clients send `hash_pin(pin)`; the PIN itself never reaches the server.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use setsunai_core::{verify, PinRecord, VerificationHash};

use super::{ApiError, AppState, UserId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub has_pin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupPinRequest {
    pub pin_hash: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinRequest {
    pub pin_hash: String,
}

pub async fn user_status(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> Result<Json<UserStatus>, ApiError> {
    let record = state.storage.get_pin_record(&user_id).await?;

    Ok(Json(UserStatus {
        has_pin: record.as_ref().is_some_and(|r| r.pin_hash.is_some()),
        name: record.and_then(|r| r.name),
    }))
}

pub async fn setup_pin(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    body: Result<Json<SetupPinRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request("PIN hash is required"))?;
    let pin_hash = VerificationHash::parse(&request.pin_hash)
        .map_err(|_| ApiError::bad_request("Invalid PIN hash format"))?;
    let name = request.name.filter(|n| !n.trim().is_empty());

    let record = match state.storage.get_pin_record(&user_id).await? {
        Some(mut existing) => {
            existing.update(pin_hash, name);
            existing
        }
        None => PinRecord::new(pin_hash, name),
    };
    state.storage.put_pin_record(&user_id, &record).await?;

    info!("PIN set up for user {}", user_id);
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn verify_pin(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    body: Result<Json<VerifyPinRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request("PIN hash is required"))?;

    let stored = state
        .storage
        .get_pin_record(&user_id)
        .await?
        .and_then(|record| record.pin_hash)
        .ok_or_else(|| ApiError::bad_request("PIN not set up"))?;

    let valid = match VerificationHash::parse(&request.pin_hash) {
        Ok(candidate) => verify(&candidate, &stored),
        Err(_) => false,
    };
    if !valid {
        warn!("Failed PIN verification for user {}", user_id);
    }

    Ok(Json(serde_json::json!({ "valid": valid })))
}
