//! API integration tests.
//!
//! These tests verify the complete keyword flow end-to-end using axum's test
//! utilities. Remote hosts are replaced by an in-memory connector.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use winrm_keywords::api::{create_router, create_router_with_state, AppState};
use winrm_keywords::{CommandOutput, Connector, Credentials, RemoteSession, WinRmLibrary};

/// Session that answers every command with its own hostname.
struct FakeSession {
    host: String,
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn run_cmd(
        &self,
        command: &str,
        params: &[String],
    ) -> winrm_keywords::Result<CommandOutput> {
        if command == "exit" {
            return Ok(CommandOutput::new(3, "", "bye"));
        }
        Ok(CommandOutput::new(
            0,
            format!("{} {} {}", self.host, command, params.join(" ")),
            "",
        ))
    }

    async fn run_ps(&self, script: &str) -> winrm_keywords::Result<CommandOutput> {
        Ok(CommandOutput::new(0, format!("{}> {}", self.host, script), ""))
    }
}

struct FakeConnector;

impl Connector for FakeConnector {
    fn connect(
        &self,
        hostname: &str,
        _credentials: Credentials,
    ) -> winrm_keywords::Result<Arc<dyn RemoteSession>> {
        Ok(Arc::new(FakeSession {
            host: hostname.to_string(),
        }))
    }
}

fn app() -> Router {
    create_router_with_state(AppState::new(WinRmLibrary::new(Arc::new(FakeConnector))))
}

/// Helper to create a JSON request.
fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to extract body as string.
async fn response_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Helper to extract JSON from response.
async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Run a keyword against `app` and return the JSON result.
async fn run_keyword(app: &Router, name: &str, body: Value) -> (StatusCode, Value) {
    let uri = format!("/api/v1/keywords/{}", name.replace(' ', "%20"));
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, &uri, Some(body)))
        .await
        .unwrap();
    let status = response.status();
    (status, response_json(response).await)
}

// ============================================================================
// Health & Info Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router().unwrap();

    let response = app
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_text(response).await, "OK");
}

#[tokio::test]
async fn test_api_info_endpoint() {
    let response = app()
        .oneshot(json_request(Method::GET, "/api/v1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["name"], "winrm-keywords");
    assert_eq!(json["status"], "running");
}

#[tokio::test]
async fn test_list_keywords() {
    let response = app()
        .oneshot(json_request(Method::GET, "/api/v1/keywords", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["count"], 4);

    let names: Vec<&str> = json["keywords"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Create Session", "Run Cmd", "Run Ps", "Delete All Sessions"]
    );
}

// ============================================================================
// Keyword Flow Tests
// ============================================================================

#[tokio::test]
async fn test_full_keyword_flow() {
    let app = app();

    let (status, json) = run_keyword(
        &app,
        "Create Session",
        json!({"args": ["server", "win-01", "Administrator", "secret"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "PASS");
    assert_eq!(json["return"], 0);

    let (_, json) = run_keyword(
        &app,
        "run_cmd",
        json!({"args": ["server", "ipconfig"], "kwargs": {"params": ["/all"]}}),
    )
    .await;
    assert_eq!(json["status"], "PASS");
    assert_eq!(json["return"]["status_code"], 0);
    assert_eq!(json["return"]["std_out"], "win-01 ipconfig /all");
    assert_eq!(json["return"]["std_err"], "");

    let (_, json) = run_keyword(
        &app,
        "Run Ps",
        json!({"args": ["server", "Get-Process | Measure-Object"]}),
    )
    .await;
    assert_eq!(json["status"], "PASS");
    assert_eq!(json["return"]["std_out"], "win-01> Get-Process | Measure-Object");

    let (_, json) = run_keyword(&app, "Delete All Sessions", json!({})).await;
    assert_eq!(json["status"], "PASS");
    assert!(json["return"].is_null());

    let (_, json) = run_keyword(&app, "Run Cmd", json!({"args": ["server", "dir"]})).await;
    assert_eq!(json["status"], "FAIL");
    assert_eq!(json["error_code"], "SESSION_NOT_FOUND");
    assert_eq!(json["error"], "Non-existing index or alias 'server'.");
}

#[tokio::test]
async fn test_nonzero_exit_is_a_pass() {
    let app = app();

    run_keyword(
        &app,
        "Create Session",
        json!({"args": ["server", "win-01", "Administrator", "secret"]}),
    )
    .await;

    let (_, json) = run_keyword(&app, "Run Cmd", json!({"args": ["server", "exit"]})).await;
    assert_eq!(json["status"], "PASS");
    assert_eq!(json["return"]["status_code"], 3);
    assert_eq!(json["return"]["std_err"], "bye");
}

#[tokio::test]
async fn test_aliases_select_hosts() {
    let app = app();

    for (alias, host) in [("first", "win-01"), ("second", "win-02")] {
        run_keyword(
            &app,
            "Create Session",
            json!({"args": [alias, host, "Administrator", "secret"]}),
        )
        .await;
    }

    let (_, json) = run_keyword(&app, "Run Cmd", json!({"args": ["first", "hostname"]})).await;
    assert_eq!(json["return"]["std_out"], "win-01 hostname ");

    let (_, json) = run_keyword(&app, "Run Cmd", json!({"args": ["1", "hostname"]})).await;
    assert_eq!(json["return"]["std_out"], "win-02 hostname ");
}

#[tokio::test]
async fn test_run_cmd_unknown_alias() {
    let (status, json) = run_keyword(&app(), "Run Cmd", json!({"args": ["ghost", "dir"]})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "FAIL");
    assert_eq!(json["error_code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_missing_arguments() {
    let (status, json) = run_keyword(&app(), "Create Session", json!({"args": ["server"]})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "FAIL");
    assert_eq!(json["error_code"], "INVALID_ARGUMENTS");
}

#[tokio::test]
async fn test_unknown_keyword() {
    let (status, json) = run_keyword(&app(), "Open Connection", json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "KEYWORD_NOT_FOUND");
}

// ============================================================================
// Session Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_sessions() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/sessions", None))
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["count"], 0);
    assert!(json["current"].is_null());

    run_keyword(
        &app,
        "Create Session",
        json!({"args": ["server", "win-01", "Administrator", "secret"]}),
    )
    .await;
    run_keyword(
        &app,
        "Create Session",
        json!({"args": ["server", "win-02", "Administrator", "secret"]}),
    )
    .await;

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/sessions", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["current"], 1);
    assert_eq!(json["sessions"][0]["aliases"], json!([]));
    assert_eq!(json["sessions"][1]["aliases"], json!(["server"]));
}

#[tokio::test]
async fn test_password_not_echoed() {
    let app = app();

    let (_, json) = run_keyword(
        &app,
        "Create Session",
        json!({"args": ["server", "win-01", "Administrator", "hunter2"]}),
    )
    .await;
    assert!(!json.to_string().contains("hunter2"));

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/sessions", None))
        .await
        .unwrap();
    assert!(!response_text(response).await.contains("hunter2"));
}
