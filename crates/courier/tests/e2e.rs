// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: the gateway over a real socket, and the `courier` binary.

use std::path::Path;
use std::process::{Command, Output};

use courier_core::types::DispatchResponse;
use courier_test_utils::TestHarness;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

// ---- HTTP over a real listener ----

async fn spawn_gateway(harness: &TestHarness) -> (String, CancellationToken) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let state = harness.gateway_state();

    tokio::spawn(async move {
        courier_gateway::serve(listener, state, async move { token.cancelled().await })
            .await
            .unwrap();
    });

    (format!("http://{addr}"), cancel)
}

#[tokio::test]
async fn retry_over_http_delivers_and_then_refuses() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_message("msg_1", "whatsapp_business").await.unwrap();
    let (base, cancel) = spawn_gateway(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/retry"))
        .header("X-Api-Key", &harness.api_key)
        .json(&json!({ "message_id": "msg_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "delivered");
    assert_eq!(body["attempts"], 1);

    let resp = client
        .post(format!("{base}/api/retry"))
        .header("X-Api-Key", &harness.api_key)
        .json(&json!({ "message_id": "msg_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Message already delivered");

    cancel.cancel();
}

#[tokio::test]
async fn failed_then_listed_over_http() {
    let harness = TestHarness::builder()
        .with_default_response(DispatchResponse::new(503, "err"))
        .build()
        .await
        .unwrap();
    harness.seed_message("msg_1", "wappi").await.unwrap();
    let (base, cancel) = spawn_gateway(&harness).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/retry"))
        .header("X-Api-Key", &harness.api_key)
        .json(&json!({ "message_id": "msg_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);

    let resp = client
        .get(format!("{base}/api/messages?message_id=msg_1"))
        .header("X-Api-Key", &harness.api_key)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"]["status"], "failed");
    assert_eq!(
        body["message"]["last_error"],
        "Provider returned status 503"
    );
    assert_eq!(body["message"]["delivery_attempts"][0]["response_body"], "err");

    let resp = client.get(format!("{base}/api/messages")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    cancel.cancel();
}

// ---- The binary ----

fn write_config(dir: &Path) -> std::path::PathBuf {
    let db = dir.join("courier.db");
    let config = format!(
        r#"
[service]
log_level = "warn"

[storage]
database_path = "{}"

[transport]
simulate_unknown_providers = true
simulated_success_rate = 1.0
simulated_delay_ms = 0
"#,
        db.to_string_lossy().replace('\\', "/")
    );
    let path = dir.join("courier.toml");
    std::fs::write(&path, config).unwrap();
    path
}

fn courier(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_courier"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn cli_config_check_prints_effective_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = courier(&config, &["config", "check"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let value = stdout_json(&out);
    assert_eq!(value["transport"]["simulate_unknown_providers"], true);
    assert_eq!(value["gateway"]["port"], 3000);
}

#[test]
fn cli_rejects_unknown_config_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[gateway]\nprot = 8080\n").unwrap();

    let out = courier(&path, &["config", "check"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("prot"));
}

#[test]
fn cli_add_and_retry_message() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = courier(
        &config,
        &[
            "messages",
            "add",
            "--id",
            "msg_cli",
            "--provider",
            "acme_sms",
            "--recipient",
            "+7 900 000-00-00",
            "--text",
            "hello",
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_json(&out)["message_id"], "msg_cli");

    let out = courier(&config, &["retry", "msg_cli"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let value = stdout_json(&out);
    assert_eq!(value["status"], "delivered");
    assert_eq!(value["attempts"], 1);

    let out = courier(&config, &["retry", "msg_cli"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("already delivered"));

    let out = courier(&config, &["messages", "show", "msg_cli"]);
    assert!(out.status.success());
    let value = stdout_json(&out);
    assert_eq!(value["message"]["status"], "delivered");
    assert_eq!(value["delivery_attempts"].as_array().unwrap().len(), 1);
}

#[test]
fn cli_manages_api_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = courier(&config, &["keys", "create", "dashboard"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let key = stdout_json(&out)["api_key"].as_str().unwrap().to_string();
    assert!(key.starts_with("ek_live_"));

    let out = courier(&config, &["keys", "revoke", &key]);
    assert!(out.status.success());

    let out = courier(&config, &["keys", "list"]);
    let keys = stdout_json(&out);
    assert_eq!(keys[0]["is_active"], false);

    let out = courier(&config, &["keys", "revoke", "ek_live_missing"]);
    assert_eq!(out.status.code(), Some(1));
}
