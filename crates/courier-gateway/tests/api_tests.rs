// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use courier_core::types::DispatchResponse;
use courier_config::model::StorageConfig;
use courier_core::StorageAdapter;
use courier_gateway::{GatewayState, HealthState, build_router};
use courier_storage::SqliteStorage;
use courier_test_utils::TestHarness;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(harness: &TestHarness, req: Request<Body>) -> (StatusCode, Value) {
    let resp = harness.router().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn authed(harness: &TestHarness, method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", &harness.api_key)
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn retry_request(harness: &TestHarness, message_id: &str) -> Request<Body> {
    authed(
        harness,
        Method::POST,
        "/api/retry",
        Some(json!({ "message_id": message_id })),
    )
}

// --- health ---

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new().await.unwrap();
    let req = Request::get("/health").body(Body::empty()).unwrap();

    let (status, body) = call(&harness, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], "0.0.0-test");
    assert!(body["uptime_secs"].is_u64());
}

#[tokio::test]
async fn health_reports_503_when_store_is_unavailable() {
    let harness = TestHarness::new().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let uninitialized = SqliteStorage::new(StorageConfig {
        database_path: dir.path().join("never.db").to_string_lossy().into_owned(),
        wal_mode: true,
    });
    let state = GatewayState {
        storage: Arc::new(uninitialized),
        orchestrator: harness.orchestrator.clone(),
        health: HealthState::new("0.0.0-test"),
    };
    let req = Request::get("/health").body(Body::empty()).unwrap();

    let resp = build_router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "unhealthy");
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_is_401() {
    let harness = TestHarness::new().await.unwrap();
    let req = Request::post("/api/retry")
        .body(Body::from(r#"{"message_id":"m"}"#))
        .unwrap();

    let (status, body) = call(&harness, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Missing API key" }));
}

#[tokio::test]
async fn unknown_and_revoked_keys_are_401() {
    let harness = TestHarness::new().await.unwrap();

    let req = Request::get("/api/messages")
        .header("x-api-key", "ek_live_bogus")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&harness, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid API key");

    assert!(harness.storage.revoke_api_key(&harness.api_key).await.unwrap());
    let (status, body) = call(&harness, authed(&harness, Method::GET, "/api/messages", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
async fn valid_key_stamps_last_used_at() {
    let harness = TestHarness::new().await.unwrap();
    let before = harness.storage.list_api_keys().await.unwrap();
    assert!(before[0].last_used_at.is_none());

    let (status, _) = call(&harness, authed(&harness, Method::GET, "/api/messages", None)).await;
    assert_eq!(status, StatusCode::OK);

    let after = harness.storage.list_api_keys().await.unwrap();
    assert!(after[0].last_used_at.is_some());
}

// --- routing ---

#[tokio::test]
async fn wrong_method_is_405_before_auth() {
    let harness = TestHarness::new().await.unwrap();

    for (method, uri) in [
        (Method::GET, "/api/retry"),
        (Method::DELETE, "/api/messages"),
        (Method::PATCH, "/api/providers"),
        (Method::POST, "/health"),
    ] {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&harness, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_eq!(body["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let harness = TestHarness::new().await.unwrap();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/retry")
        .header(header::ORIGIN, "https://dashboard.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-api-key")
        .body(Body::empty())
        .unwrap();

    let resp = harness.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-api-key"));
    assert!(allowed.contains("content-type"));
}

#[tokio::test]
async fn plain_options_is_200() {
    let harness = TestHarness::new().await.unwrap();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/providers")
        .body(Body::empty())
        .unwrap();

    let (status, _) = call(&harness, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_wildcard_origin() {
    let harness = TestHarness::new().await.unwrap();
    let req = Request::get("/health")
        .header(header::ORIGIN, "https://dashboard.example")
        .body(Body::empty())
        .unwrap();

    let resp = harness.router().oneshot(req).await.unwrap();
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

// --- retry ---

#[tokio::test]
async fn retry_delivers() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_message("msg_1", "wappi").await.unwrap();

    let (status, body) = call(&harness, retry_request(&harness, "msg_1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message_id": "msg_1",
            "status": "delivered",
            "attempts": 1,
        })
    );
}

#[tokio::test]
async fn retry_rejected_by_provider_is_500() {
    let harness = TestHarness::builder()
        .with_default_response(DispatchResponse::new(503, "err"))
        .build()
        .await
        .unwrap();
    harness.seed_message("msg_1", "wappi").await.unwrap();

    let (status, body) = call(&harness, retry_request(&harness, "msg_1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message_id": "msg_1",
            "status": "failed",
            "attempts": 1,
            "error": "Provider returned status 503",
        })
    );
}

#[tokio::test]
async fn retry_errored_omits_attempts() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_message("msg_1", "acme_sms").await.unwrap();

    let (status, body) = call(&harness, retry_request(&harness, "msg_1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "failed");
    assert_eq!(
        body["error"],
        "no transport registered for provider `acme_sms`"
    );
    assert!(body.get("attempts").is_none());
}

#[tokio::test]
async fn retry_already_delivered_is_400() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_message("msg_1", "wappi").await.unwrap();
    harness
        .set_message_state("msg_1", "delivered", 1)
        .await
        .unwrap();

    let (status, body) = call(&harness, retry_request(&harness, "msg_1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Message already delivered", "message_id": "msg_1" })
    );
    assert!(harness.attempts("msg_1").await.unwrap().is_empty());
}

#[tokio::test]
async fn retry_unknown_message_is_404() {
    let harness = TestHarness::new().await.unwrap();

    let (status, body) = call(&harness, retry_request(&harness, "missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Message not found" }));
}

#[tokio::test]
async fn retry_body_validation() {
    let harness = TestHarness::new().await.unwrap();

    let req = Request::post("/api/retry")
        .header("x-api-key", &harness.api_key)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call(&harness, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON");

    for payload in [json!({}), json!({ "message_id": "" }), json!({ "message_id": 7 })] {
        let req = authed(&harness, Method::POST, "/api/retry", Some(payload));
        let (status, body) = call(&harness, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing message_id");
    }
}

#[tokio::test]
async fn retry_store_failure_is_500_with_details() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_message("msg_1", "wappi").await.unwrap();
    harness.store.fail_get(true);

    let (status, body) = call(&harness, retry_request(&harness, "msg_1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].as_str().unwrap().contains("injected"));
}

// --- messages ---

#[tokio::test]
async fn messages_are_listed_newest_first() {
    let harness = TestHarness::new().await.unwrap();
    for i in 0..3 {
        harness.seed_message(&format!("msg_{i}"), "wappi").await.unwrap();
    }

    let (status, body) = call(
        &harness,
        authed(&harness, Method::GET, "/api/messages?limit=2", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["messages"][0]["message_id"], "msg_2");
    assert_eq!(body["messages"][1]["message_id"], "msg_1");
    assert_eq!(body["messages"][0]["status"], "pending");
    assert_eq!(body["messages"][0]["max_attempts"], 3);
}

#[tokio::test]
async fn messages_limit_is_clamped_or_rejected() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_message("msg_1", "wappi").await.unwrap();

    let (status, body) = call(
        &harness,
        authed(&harness, Method::GET, "/api/messages?limit=0", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = call(
        &harness,
        authed(&harness, Method::GET, "/api/messages?limit=abc", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid limit");
}

#[tokio::test]
async fn message_detail_includes_attempts() {
    let harness = TestHarness::builder()
        .with_responses(vec![DispatchResponse::new(503, "busy")])
        .build()
        .await
        .unwrap();
    harness.seed_message("msg_1", "wappi").await.unwrap();
    harness.orchestrator.retry("msg_1").await.unwrap();
    harness.orchestrator.retry("msg_1").await.unwrap();

    let (status, body) = call(
        &harness,
        authed(&harness, Method::GET, "/api/messages?message_id=msg_1", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message = &body["message"];
    assert_eq!(message["status"], "delivered");
    assert_eq!(message["attempts"], 2);
    let attempts = message["delivery_attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0]["status"], "failed");
    assert_eq!(attempts[0]["response_code"], 503);
    assert_eq!(attempts[1]["status"], "success");

    let (status, body) = call(
        &harness,
        authed(&harness, Method::GET, "/api/messages?message_id=ghost", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Message not found");
}

// --- providers ---

fn wappi_provider() -> Value {
    json!({
        "provider_code": "wappi",
        "provider_name": "Wappi",
        "provider_type": "messenger",
        "wappi_token": "tok",
        "wappi_profile_id": "prof",
        "unrelated": "dropped",
    })
}

#[tokio::test]
async fn provider_create_and_conflict() {
    let harness = TestHarness::new().await.unwrap();

    let (status, body) = call(
        &harness,
        authed(&harness, Method::PUT, "/api/providers", Some(wappi_provider())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["provider_code"], "wappi");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["message"], "Provider created successfully");

    let (status, _) = call(
        &harness,
        authed(&harness, Method::PUT, "/api/providers", Some(wappi_provider())),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &harness,
        authed(
            &harness,
            Method::GET,
            "/api/providers/config?provider_code=wappi",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["config"],
        json!({ "wappi_token": "tok", "wappi_profile_id": "prof" })
    );
}

#[tokio::test]
async fn provider_create_validation() {
    let harness = TestHarness::new().await.unwrap();

    let (status, body) = call(
        &harness,
        authed(
            &harness,
            Method::PUT,
            "/api/providers",
            Some(json!({ "provider_name": "X" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing provider_code");

    let (status, body) = call(
        &harness,
        authed(
            &harness,
            Method::PUT,
            "/api/providers",
            Some(json!({ "provider_code": "x" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing provider_name for new provider");
}

#[tokio::test]
async fn provider_list_derives_connection_status() {
    let harness = TestHarness::new().await.unwrap();
    call(
        &harness,
        authed(&harness, Method::PUT, "/api/providers", Some(wappi_provider())),
    )
    .await;
    call(
        &harness,
        authed(
            &harness,
            Method::PUT,
            "/api/providers",
            Some(json!({ "provider_code": "fcm", "provider_name": "Firebase" })),
        ),
    )
    .await;

    let (status, body) = call(&harness, authed(&harness, Method::GET, "/api/providers", None)).await;
    assert_eq!(status, StatusCode::OK);
    let providers = body["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 2);
    // Ordered by name.
    assert_eq!(providers[0]["provider_name"], "Firebase");
    assert_eq!(providers[0]["connection_status"], "not_configured");
    assert_eq!(providers[0]["provider_type"], "custom");
    assert_eq!(providers[1]["connection_status"], "configured");
    assert!(providers[1]["last_attempt_status"].is_null());

    harness.seed_message("msg_1", "wappi").await.unwrap();
    // Attempt timestamps have millisecond resolution.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    harness.orchestrator.retry("msg_1").await.unwrap();

    let (_, body) = call(&harness, authed(&harness, Method::GET, "/api/providers", None)).await;
    let wappi = &body["providers"][1];
    assert_eq!(wappi["connection_status"], "working");
    assert_eq!(wappi["last_attempt_status"], "success");
    assert_eq!(wappi["last_response_code"], 200);
}

#[tokio::test]
async fn provider_update_replaces_config() {
    let harness = TestHarness::new().await.unwrap();
    call(
        &harness,
        authed(&harness, Method::PUT, "/api/providers", Some(wappi_provider())),
    )
    .await;

    let (status, body) = call(
        &harness,
        authed(
            &harness,
            Method::POST,
            "/api/providers",
            Some(json!({ "provider_code": "wappi", "wappi_token": "new" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Provider configuration updated successfully");

    let provider = harness.storage.get_provider("wappi").await.unwrap().unwrap();
    assert_eq!(provider.config.len(), 1);
    assert_eq!(provider.config["wappi_token"], "new");

    let (status, body) = call(
        &harness,
        authed(
            &harness,
            Method::POST,
            "/api/providers",
            Some(json!({ "provider_code": "ghost" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Provider not found");
}

#[tokio::test]
async fn provider_delete() {
    let harness = TestHarness::new().await.unwrap();
    call(
        &harness,
        authed(&harness, Method::PUT, "/api/providers", Some(wappi_provider())),
    )
    .await;

    let (status, body) = call(
        &harness,
        authed(&harness, Method::DELETE, "/api/providers?provider_code=wappi", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Provider Wappi deleted successfully");

    let (status, _) = call(
        &harness,
        authed(&harness, Method::DELETE, "/api/providers?provider_code=wappi", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &harness,
        authed(&harness, Method::DELETE, "/api/providers", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing provider_code parameter");
}

#[tokio::test]
async fn provider_config_lookup_errors() {
    let harness = TestHarness::new().await.unwrap();

    let (status, body) = call(
        &harness,
        authed(&harness, Method::GET, "/api/providers/config", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing provider_code parameter");

    let (status, body) = call(
        &harness,
        authed(
            &harness,
            Method::GET,
            "/api/providers/config?provider_code=ghost",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Provider not found");
}
