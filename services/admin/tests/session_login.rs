mod common;

use axum::http::StatusCode;
use cadence_authz::{
    ClaimsCodec, REMEMBER_ME_TTL, SUPER_GROUP_ID, SessionTtl, SigningConfig, now_epoch_seconds,
};
use common::{Harness, Script, read_json};
use http_helpers::json_request;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn harness() -> Harness {
    Harness::new(Script::Reply(serde_json::Value::Null))
}

async fn login(harness: &Harness, body: serde_json::Value) -> axum::response::Response {
    harness
        .router()
        .oneshot(json_request("POST", "/v1/user/login", None, body))
        .await
        .expect("response")
}

#[tokio::test]
async fn login_returns_a_usable_session() {
    let harness = harness();
    let team = harness.group("alpha").await;
    let alice = harness.user("alice", team, true).await;

    let before = now_epoch_seconds();
    let response = login(
        &harness,
        json!({ "username": "alice", "password": "alice-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user_id"], alice.id.get());
    assert_eq!(body["group_id"], team.get());
    assert_eq!(body["root"], true);
    assert_eq!(body["mail"], "alice@example.com");
    let expires_at = body["expires_at"].as_i64().expect("expires_at");
    assert!(expires_at >= before + 3600 && expires_at <= now_epoch_seconds() + 3600);

    let token = body["token"].as_str().expect("token");
    let claims = harness.state.codec.verify(token).expect("verify");
    assert_eq!(claims.user_id(), alice.id);
    assert_eq!(claims.username(), "alice");

    let response = harness
        .router()
        .oneshot(json_request(
            "POST",
            "/v1/user/activity",
            Some(token),
            json!({}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn remember_me_issues_the_long_session() {
    let harness = harness();
    harness.user("alice", SUPER_GROUP_ID, false).await;

    let before = now_epoch_seconds();
    let response = login(
        &harness,
        json!({ "username": "alice", "password": "alice-password", "remember": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let expires_at = read_json(response).await["expires_at"]
        .as_i64()
        .expect("expires_at");
    assert!(expires_at >= before + REMEMBER_ME_TTL.as_secs() as i64);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let harness = harness();
    harness.user("alice", SUPER_GROUP_ID, false).await;

    let wrong_password = login(
        &harness,
        json!({ "username": "alice", "password": "not-her-password" }),
    )
    .await;
    let unknown_user = login(
        &harness,
        json!({ "username": "mallory", "password": "whatever" }),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = read_json(wrong_password).await;
    let unknown_user = read_json(unknown_user).await;
    assert_eq!(wrong_password["code"], "invalid_credentials");
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn expired_and_malformed_tokens_are_told_apart() {
    let harness = harness();
    let alice = harness.user("alice", SUPER_GROUP_ID, false).await;

    let expired = harness
        .state
        .codec
        .issue_at(alice.identity(), SessionTtl::Default, now_epoch_seconds() - 7200)
        .expect("token")
        .token;
    let foreign = ClaimsCodec::new(Arc::new(SigningConfig::new(
        b"some-other-key".to_vec(),
        Duration::from_secs(3600),
    )))
    .issue(alice.identity(), SessionTtl::Default)
    .expect("token")
    .token;

    for (token, code) in [
        (expired.as_str(), "token_expired"),
        (foreign.as_str(), "token_malformed"),
        ("not.a.token", "token_malformed"),
    ] {
        let response = harness
            .router()
            .oneshot(json_request("POST", "/v1/user/stat", Some(token), json!({})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{code}");
        assert_eq!(read_json(response).await["code"], code);
    }
}

#[tokio::test]
async fn missing_credentials_fail_validation() {
    let harness = harness();
    let response = login(&harness, json!({ "username": "", "password": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_the_backend() {
    let harness = harness();
    let response = harness
        .router()
        .oneshot(
            axum::http::Request::builder()
                .uri("/v1/system/health")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn unparseable_body_gets_the_json_error_shape() {
    let harness = harness();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/user/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"username\": "))
        .expect("request");
    let response = harness.router().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "validation_error");
    assert!(body["message"].as_str().is_some_and(|msg| !msg.is_empty()));
}
