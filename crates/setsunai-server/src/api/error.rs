//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use setsunai_core::NotesError;

/// An error as the client sees it: a status and a short message
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn invalid_post() -> Self {
        Self::bad_request("Invalid post data")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<NotesError> for ApiError {
    fn from(err: NotesError) -> Self {
        match err {
            NotesError::NotAuthorized => Self::new(StatusCode::FORBIDDEN, "Not authorized"),
            NotesError::NoteNotFound(_) => Self::new(StatusCode::NOT_FOUND, "Post not found"),
            NotesError::PinNotSet => Self::bad_request("PIN not set up"),
            NotesError::MalformedEnvelope | NotesError::MalformedRecord(_) => Self::invalid_post(),
            other => {
                error!("Request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Request failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
