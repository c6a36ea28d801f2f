//! End-to-end tests of the HTTP API with a client sealing locally

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use setsunai_core::{
    derive_key, hash_pin, open, seal, DerivedKey, Envelope, KeyDerivationParams, MemoryStore,
};
use setsunai_server::{router, USER_ID_HEADER};

// Any well-formed id that was never issued
const UNKNOWN_ID: &str = "00000000-0000-4000-8000-000000000000";

fn app() -> Router {
    router(Arc::new(MemoryStore::new()))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header(USER_ID_HEADER, user);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn key(pin: &str, user: &str) -> DerivedKey {
    derive_key(pin, user, Some(KeyDerivationParams { iterations: 1_000 })).unwrap()
}

fn sealed(text: &str, pin: &str, user: &str) -> Envelope {
    seal(text, &key(pin, user)).unwrap()
}

fn pin_hash_body(pin: &str) -> Value {
    json!({ "pinHash": hash_pin(pin).encode() })
}

fn post_body(envelope: &Envelope) -> Value {
    json!({ "encryptedContent": envelope.ciphertext, "iv": envelope.iv })
}

fn update_body(id: &str, envelope: &Envelope) -> Value {
    json!({ "id": id, "encryptedContent": envelope.ciphertext, "iv": envelope.iv })
}

#[tokio::test]
async fn health_check() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn requests_without_user_are_rejected() {
    let app = app();

    let (status, body) = call(&app, "GET", "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");

    let (status, _) = call(&app, "GET", "/api/posts", Some("  "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pin_setup_and_verification() {
    let app = app();
    let user = Some("user-42");

    let (_, status) = call(&app, "GET", "/api/auth/user-status", user, None).await;
    assert_eq!(status["hasPin"], false);

    let (code, body) =
        call(&app, "POST", "/api/auth/verify-pin", user, Some(pin_hash_body("123456"))).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PIN not set up");

    let bad_hash = json!({ "pinHash": "too-short" });
    let (code, _) = call(&app, "POST", "/api/auth/setup-pin", user, Some(bad_hash)).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);

    let setup = json!({ "pinHash": hash_pin("123456").encode(), "name": "Ada" });
    let (code, body) = call(&app, "POST", "/api/auth/setup-pin", user, Some(setup)).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, status) = call(&app, "GET", "/api/auth/user-status", user, None).await;
    assert_eq!(status["hasPin"], true);
    assert_eq!(status["name"], "Ada");

    let (_, body) =
        call(&app, "POST", "/api/auth/verify-pin", user, Some(pin_hash_body("123456"))).await;
    assert_eq!(body["valid"], true);

    let (_, body) =
        call(&app, "POST", "/api/auth/verify-pin", user, Some(pin_hash_body("654321"))).await;
    assert_eq!(body["valid"], false);

    let garbage = json!({ "pinHash": "garbage" });
    let (_, body) = call(&app, "POST", "/api/auth/verify-pin", user, Some(garbage)).await;
    assert_eq!(body["valid"], false);

    let (code, _) = call(&app, "POST", "/api/auth/verify-pin", user, Some(json!({}))).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_lifecycle() {
    let app = app();
    let user = Some("user-42");
    let envelope = sealed("hello world", "123456", "user-42");

    let (code, created) = call(&app, "POST", "/api/posts", user, Some(post_body(&envelope))).await;
    assert_eq!(code, StatusCode::OK);
    let id = created["post"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["post"]["userId"], "user-42");
    assert!(created["post"]["createdAt"].is_i64());

    let (_, listed) = call(&app, "GET", "/api/posts", user, None).await;
    let posts = listed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);

    let stored = Envelope {
        ciphertext: posts[0]["encryptedContent"].as_str().unwrap().to_string(),
        iv: posts[0]["iv"].as_str().unwrap().to_string(),
    };
    let opened = open(&stored, &key("123456", "user-42")).unwrap();
    assert_eq!(opened.expose(), "hello world");

    let edit = sealed("hello again", "123456", "user-42");
    let edit_body = update_body(&id, &edit);
    let (code, updated) = call(&app, "PUT", "/api/posts", user, Some(edit_body)).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(updated["post"]["iv"], edit.iv.as_str());
    assert!(updated["post"]["updatedAt"].is_i64());

    let uri = format!("/api/posts?id={}", id);
    let (code, _) = call(&app, "DELETE", &uri, user, None).await;
    assert_eq!(code, StatusCode::OK);

    let (_, listed) = call(&app, "GET", "/api/posts", user, None).await;
    assert!(listed["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ownership_and_validation() {
    let app = app();
    let alice = Some("alice");
    let bob = Some("bob");
    let envelope = sealed("mine", "123456", "alice");

    let (_, created) = call(&app, "POST", "/api/posts", alice, Some(post_body(&envelope))).await;
    let id = created["post"]["id"].as_str().unwrap().to_string();

    let takeover = update_body(&id, &envelope);
    let (code, body) = call(&app, "PUT", "/api/posts", bob, Some(takeover)).await;
    assert_eq!(code, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized");

    let uri = format!("/api/posts?id={}", id);
    let (code, _) = call(&app, "DELETE", &uri, bob, None).await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    let (_, listed) = call(&app, "GET", "/api/posts", bob, None).await;
    assert!(listed["posts"].as_array().unwrap().is_empty());

    let unknown = update_body(UNKNOWN_ID, &envelope);
    let (code, _) = call(&app, "PUT", "/api/posts", alice, Some(unknown)).await;
    assert_eq!(code, StatusCode::NOT_FOUND);

    let (code, _) = call(&app, "DELETE", "/api/posts", alice, None).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);

    let not_base64 = json!({ "encryptedContent": "not base64!", "iv": envelope.iv });
    let (code, body) = call(&app, "POST", "/api/posts", alice, Some(not_base64)).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid post data");

    let missing = json!({ "iv": envelope.iv });
    let (code, _) = call(&app, "POST", "/api/posts", alice, Some(missing)).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_delete_query_is_json_error() {
    let app = app();

    let uri = format!("/api/posts?id={}&id={}", UNKNOWN_ID, UNKNOWN_ID);
    let (code, body) = call(&app, "DELETE", &uri, Some("alice"), None).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Post ID required");

    let (code, body) = call(&app, "DELETE", "/api/posts?id=not-a-uuid", Some("alice"), None).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Post ID required");
}
