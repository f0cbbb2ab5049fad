//! Integration tests for the session issuance endpoints.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use couponly::auth::partner_token::{self, PartnerClaims};
use couponly::config::Config;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

const PARTNER_SECRET: &str = "partner-secret-v1";

async fn spawn_app() -> (Arc<couponly::api::AppState>, Router) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.session.secret = "test-platform-session-secret".to_string();

    let state = couponly::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = couponly::api::router(state.clone()).await;
    (state, router)
}

async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn partner_token_for(vendor: &str, external_user_id: &str, secret: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = PartnerClaims {
        vendor: vendor.to_string(),
        external_user_id: external_user_id.to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        iat: now,
        exp: now + 180,
    };
    partner_token::sign(&claims, secret).unwrap()
}

#[tokio::test]
async fn widget_session_issues_token_for_valid_api_key() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", Some("cdk_abc"), None, Some(1))
        .await
        .unwrap();

    let (status, body) = post_json(
        &app,
        "/widget-session",
        serde_json::json!({
            "api_key": "cdk_abc",
            "vendor_id": "v1",
            "user_id": "ext-1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vendor_id"], "v1");
    assert!(!body["user_id"].as_str().unwrap().is_empty());
    assert!(!body["session_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn widget_session_accepts_email_as_identity() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", Some("cdk_abc"), None, Some(1))
        .await
        .unwrap();

    let (status, _) = post_json(
        &app,
        "/widget-session",
        serde_json::json!({
            "api_key": "cdk_abc",
            "vendor_id": "v1",
            "user_email": "shopper@example.com"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn widget_session_maps_same_identity_to_same_user() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", Some("cdk_abc"), None, Some(1))
        .await
        .unwrap();

    let payload = serde_json::json!({
        "api_key": "cdk_abc",
        "vendor_id": "v1",
        "user_id": "ext-1"
    });

    let (_, first) = post_json(&app, "/widget-session", payload.clone()).await;
    let (_, second) = post_json(&app, "/widget-session", payload).await;

    assert_eq!(first["user_id"], second["user_id"]);
}

#[tokio::test]
async fn widget_session_rejects_wrong_api_key() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", Some("cdk_abc"), None, Some(1))
        .await
        .unwrap();

    let (status, body) = post_json(
        &app,
        "/widget-session",
        serde_json::json!({
            "api_key": "wrong",
            "vendor_id": "v1",
            "user_id": "ext-1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Invalid API key"));
}

#[tokio::test]
async fn widget_session_unknown_vendor_is_not_found() {
    let (_, app) = spawn_app().await;

    let (status, _) = post_json(
        &app,
        "/widget-session",
        serde_json::json!({
            "api_key": "cdk_abc",
            "vendor_id": "missing",
            "user_id": "ext-1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn widget_session_vendor_without_key_is_bad_request() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", None, Some(PARTNER_SECRET), Some(1))
        .await
        .unwrap();

    let (status, _) = post_json(
        &app,
        "/widget-session",
        serde_json::json!({
            "api_key": "cdk_abc",
            "vendor_id": "v1",
            "user_id": "ext-1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn widget_session_requires_exactly_one_identity() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", Some("cdk_abc"), None, Some(1))
        .await
        .unwrap();

    let (neither, _) = post_json(
        &app,
        "/widget-session",
        serde_json::json!({
            "api_key": "cdk_abc",
            "vendor_id": "v1"
        }),
    )
    .await;
    assert_eq!(neither, StatusCode::BAD_REQUEST);

    let (both, _) = post_json(
        &app,
        "/widget-session",
        serde_json::json!({
            "api_key": "cdk_abc",
            "vendor_id": "v1",
            "user_id": "ext-1",
            "user_email": "shopper@example.com"
        }),
    )
    .await;
    assert_eq!(both, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_from_token_exchanges_valid_token() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", None, Some(PARTNER_SECRET), Some(1))
        .await
        .unwrap();

    let token = partner_token_for("v1", "ext-7", PARTNER_SECRET);
    let (status, body) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": token }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vendor_id"], "v1");
    assert!(!body["session_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn session_from_token_rejects_wrong_secret() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", None, Some(PARTNER_SECRET), Some(1))
        .await
        .unwrap();

    let token = partner_token_for("v1", "ext-7", "some-other-secret");
    let (status, body) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": token }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Invalid"));
}

#[tokio::test]
async fn session_from_token_rejects_expired_token() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", None, Some(PARTNER_SECRET), Some(1))
        .await
        .unwrap();

    let now = chrono::Utc::now().timestamp();
    let claims = PartnerClaims {
        vendor: "v1".to_string(),
        external_user_id: "ext-7".to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        iat: now - 400,
        exp: now - 220,
    };
    let token = partner_token::sign(&claims, PARTNER_SECRET).unwrap();

    let (status, body) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": token }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn session_from_token_rejects_replayed_token() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", None, Some(PARTNER_SECRET), Some(1))
        .await
        .unwrap();

    let token = partner_token_for("v1", "ext-7", PARTNER_SECRET);

    let (first, _) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"], "JTI_REPLAY");
}

#[tokio::test]
async fn session_from_token_vendor_without_secret_is_bad_request() {
    let (state, app) = spawn_app().await;
    state
        .store()
        .create_vendor("v1", "Acme", Some("cdk_abc"), None, Some(1))
        .await
        .unwrap();

    let token = partner_token_for("v1", "ext-7", PARTNER_SECRET);
    let (status, _) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": token }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_from_token_unknown_vendor_is_not_found() {
    let (_, app) = spawn_app().await;

    let token = partner_token_for("ghost", "ext-7", PARTNER_SECRET);
    let (status, _) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": token }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_from_token_garbage_is_unauthorized() {
    let (_, app) = spawn_app().await;

    let (status, body) = post_json(
        &app,
        "/session-from-token",
        serde_json::json!({ "token": "not-a-jwt" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Invalid"));
}
