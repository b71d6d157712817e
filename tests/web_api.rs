//! Admin API tests.

mod common;

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use common::{create_state, test_config, MockMailcow, MockReply, TEST_ADMIN_TOKEN};
use mailcow_provision::web::create_app;
use mailcow_provision::Database;

/// Test server without credentials.
async fn create_anonymous_server() -> (TestServer, Database) {
    let (state, db) = create_state(&test_config()).await;
    let server = TestServer::new(create_app(Arc::new(state))).expect("Failed to create test server");
    (server, db)
}

/// Test server sending the admin bearer token on every request.
async fn create_test_server() -> (TestServer, Database) {
    let (mut server, db) = create_anonymous_server().await;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", TEST_ADMIN_TOKEN))
        .expect("valid header value");
    server.add_header(AUTHORIZATION, bearer);
    (server, db)
}

fn settings_body(url: &str) -> Value {
    json!({
        "enabled": true,
        "api_base_url": url,
        "api_key": "super-secret-key",
        "mail_domain": "@corp.test",
        "default_quota_mb": 512,
        "auto_create_email_account": true
    })
}

#[tokio::test]
async fn test_health() {
    let (server, _db) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_api_requires_admin_token() {
    let (server, _db) = create_anonymous_server().await;

    for path in ["/api/settings", "/api/error-log", "/api/users/jdoe"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"]["code"], "UNAUTHORIZED");
    }

    server
        .put("/api/settings")
        .json(&settings_body("https://mail.corp.test"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/settings")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer wrong-token-value"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/settings")
        .add_header(AUTHORIZATION, HeaderValue::from_static(TEST_ADMIN_TOKEN))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Health stays open.
    server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_url_change_does_not_leak_stored_key() {
    let mailcow = MockMailcow::start().await;
    let other = MockMailcow::start().await;
    let (server, _db) = create_test_server().await;
    server
        .put("/api/settings")
        .json(&settings_body(&mailcow.url()))
        .await
        .assert_status_ok();

    // Enabled save pointing elsewhere without a key is rejected.
    let mut body = settings_body(&other.url());
    body["api_key"] = json!("");
    let response = server.put("/api/settings").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["error"]["message"]
        .as_str()
        .unwrap()
        .contains("API Key is required"));

    // Disabled save pointing elsewhere drops the stored key.
    body["enabled"] = json!(false);
    let response = server.put("/api/settings").json(&body).await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["api_base_url"], other.url());
    assert_eq!(json["data"]["api_key_set"], false);

    server
        .get("/api/diagnostics/connection")
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    server
        .get("/api/diagnostics/version")
        .await
        .assert_status_ok();

    assert!(other
        .requests()
        .iter()
        .all(|request| request.header("x-api-key").is_none()));
    assert_eq!(other.list_calls(), 0);
}

#[tokio::test]
async fn test_stored_url_always_has_lowercase_scheme() {
    let (server, _db) = create_test_server().await;

    let response = server
        .put("/api/settings")
        .json(&settings_body("HTTPS://mail.corp.test/"))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["api_base_url"],
        "https://mail.corp.test"
    );

    for url in [
        "https:mail.corp.test",
        "https:/mail.corp.test",
        "http:\\\\mail.corp.test",
        "HTTPS:mail.corp.test",
        "hTTp:/mail.corp.test",
        "https:///mail.corp.test",
    ] {
        server
            .put("/api/settings")
            .json(&settings_body(url))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    for url in ["Http://mail.corp.test", "hTTpS://mail.corp.test", "http://mail.corp.test"] {
        server
            .put("/api/settings")
            .json(&settings_body(url))
            .await
            .assert_status_ok();
        let json: Value = server.get("/api/settings").await.json();
        let stored = json["data"]["api_base_url"].as_str().unwrap().to_string();
        assert!(
            stored.starts_with("http://") || stored.starts_with("https://"),
            "{url} stored as {stored}"
        );
        assert!(stored.ends_with("://mail.corp.test"));
    }
}

#[tokio::test]
async fn test_get_default_settings() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/settings").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["enabled"], false);
    assert_eq!(json["data"]["api_key_set"], false);
    assert_eq!(json["data"]["default_quota_mb"], 1024);
}

#[tokio::test]
async fn test_save_settings_normalizes_and_masks() {
    let (server, _db) = create_test_server().await;

    let response = server
        .put("/api/settings")
        .json(&settings_body("  https://mail.corp.test///  "))
        .await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["api_base_url"], "https://mail.corp.test");
    assert_eq!(json["data"]["mail_domain"], "corp.test");
    assert_eq!(json["data"]["api_key_set"], true);
    assert!(!response.text().contains("super-secret-key"));

    // Saving again without a key keeps the stored one.
    let mut body = settings_body("https://mail.corp.test");
    body["api_key"] = json!("");
    let response = server.put("/api/settings").json(&body).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["api_key_set"], true);
}

#[tokio::test]
async fn test_save_settings_rejects_missing_field() {
    let (server, _db) = create_test_server().await;

    let mut body = settings_body("https://mail.corp.test");
    body["mail_domain"] = json!("   ");
    let response = server.put("/api/settings").json(&body).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "UNPROCESSABLE_ENTITY");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Mail Domain"));

    // Nothing was stored.
    let json: Value = server.get("/api/settings").await.json();
    assert_eq!(json["data"]["enabled"], false);
}

#[tokio::test]
async fn test_save_settings_rejects_bad_scheme() {
    let (server, _db) = create_test_server().await;

    let response = server
        .put("/api/settings")
        .json(&settings_body("ftp://mail.corp.test"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_user_provisions_mailbox() {
    let mock = MockMailcow::start().await;
    let (server, _db) = create_test_server().await;
    server
        .put("/api/settings")
        .json(&settings_body(&mock.url()))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/users")
        .json(&json!({"name": "jane", "email": "jane@external.example", "full_name": "Jane Roe"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let json: Value = response.json();
    assert_eq!(json["data"]["email"], "jane@corp.test");
    assert_eq!(json["data"]["user_type"], "System User");
    assert_eq!(mock.last_request().json()["quota"], 512);

    let response = server.get("/api/users/jane").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["email_accounts"][0]["email_id"], "jane@corp.test");
    assert!(json["data"]["email_accounts"][0].get("password").is_none());
    assert_eq!(
        json["data"]["comments"][0]["content"],
        "Mailcow mailbox created: jane@corp.test"
    );
}

#[tokio::test]
async fn test_create_user_conflict_and_validation() {
    let (server, _db) = create_test_server().await;

    server
        .post("/api/users")
        .json(&json!({"name": "jdoe"}))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .post("/api/users")
        .json(&json!({"name": "jdoe"}))
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .post("/api/users")
        .json(&json!({"name": "  "}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post("/api/users")
        .json(&json!({"name": "bot", "user_type": "Robot"}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_unknown_user() {
    let (server, _db) = create_test_server().await;
    let response = server.get("/api/users/ghost").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_manual_provision() {
    let mock = MockMailcow::start().await;
    mock.set_add_reply(MockReply::json(
        StatusCode::OK,
        json!({"success": false, "msg": "domain not found"}),
    ));
    let (server, _db) = create_test_server().await;
    server
        .put("/api/settings")
        .json(&settings_body(&mock.url()))
        .await
        .assert_status_ok();
    server
        .post("/api/users")
        .json(&json!({"name": "jdoe"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/error-log").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"][0]["title"], "Mailcow mailbox creation failed");
    assert!(json["data"][0]["message"]
        .as_str()
        .unwrap()
        .contains("domain not found"));

    mock.set_add_reply(MockReply::mailbox_added());
    let response = server.post("/api/users/jdoe/provision").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["status"], "created");
    assert_eq!(json["data"]["address"], "jdoe@corp.test");

    let response = server.post("/api/users/jdoe/provision").await;
    assert_eq!(response.json::<Value>()["data"]["status"], "already_provisioned");
    assert_eq!(mock.add_calls(), 2);
}

#[tokio::test]
async fn test_connection_diagnostics() {
    let mock = MockMailcow::start().await;
    mock.set_list_reply(MockReply::json(
        StatusCode::OK,
        json!([
            {"username": "a@corp.test", "name": "A", "domain": "corp.test"},
            {"username": "b@corp.test", "name": "B", "domain": "corp.test"}
        ]),
    ));
    let (server, _db) = create_test_server().await;

    // Not configured yet.
    server
        .get("/api/diagnostics/connection")
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .put("/api/settings")
        .json(&settings_body(&mock.url()))
        .await
        .assert_status_ok();

    let response = server.get("/api/diagnostics/connection").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["success"], true);
    assert_eq!(json["data"]["mailbox_count"], 2);
    assert_eq!(
        mock.last_request().header("x-api-key").as_deref(),
        Some("super-secret-key")
    );

    mock.set_list_reply(MockReply {
        status: StatusCode::UNAUTHORIZED,
        body: "invalid key".to_string(),
    });
    let json: Value = server.get("/api/diagnostics/connection").await.json();
    assert_eq!(json["data"]["success"], false);
    assert!(json["data"]["message"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn test_version_diagnostics() {
    let mock = MockMailcow::start().await;
    let (server, _db) = create_test_server().await;
    server
        .put("/api/settings")
        .json(&settings_body(&mock.url()))
        .await
        .assert_status_ok();

    let response = server.get("/api/diagnostics/version").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["version"], "2024-11b");
    assert_eq!(mock.version_calls(), 1);
    assert!(mock.last_request().header("x-api-key").is_none());
}

#[tokio::test]
async fn test_version_unreachable_is_bad_gateway() {
    let (server, _db) = create_test_server().await;
    server
        .put("/api/settings")
        .json(&settings_body("http://127.0.0.1:9"))
        .await
        .assert_status_ok();

    let response = server.get("/api/diagnostics/version").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["error"]["code"], "BAD_GATEWAY");
}
