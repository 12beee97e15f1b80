//! Per-session document store tests: bearer auth, round trip, isolation.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mcp_gateway::catalog::Catalog;
use mcp_gateway::config::{GatewayConfig, StreamConfig};
use mcp_gateway::dispatch::Dispatcher;
use mcp_gateway::registry::ToolRegistry;
use mcp_gateway::server::GatewayServer;
use mcp_gateway::session::SessionManager;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_router() -> Router {
    let config = GatewayConfig::default();
    let sessions = Arc::new(SessionManager::new(config.session.clone()));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(ToolRegistry::new()),
        sessions,
        Arc::new(Catalog::builtin()),
        8,
    ));
    GatewayServer::new(dispatcher, StreamConfig {
        heartbeat_interval_seconds: 30,
        idle_timeout_seconds: 300,
    })
    .router()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn user_data(method: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri("/api/user/data")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_default();
    builder.body(body).unwrap()
}

async fn create_token(router: &Router) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/initialize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"id": 1, "jsonrpc": "2.0", "method": "initialize", "params": {}}).to_string(),
        ))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    body["result"]["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_requires_auth() {
    let router = test_router();
    let (status, _) = send(&router, user_data("GET", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &router,
        user_data("GET", Some("forged-token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_post_get_delete_cycle() {
    let router = test_router();
    let token = create_token(&router).await;
    let payload = json!({"foo": "bar"});

    let (status, _) = send(
        &router,
        user_data("POST", Some(&token), Some(payload.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, user_data("GET", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);

    // other session must not see the data
    let other = create_token(&router).await;
    let (status, body) = send(&router, user_data("GET", Some(&other), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = send(&router, user_data("DELETE", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, user_data("GET", Some(&token), None)).await;
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_non_object_document_rejected() {
    let router = test_router();
    let token = create_token(&router).await;

    let (status, body) = send(
        &router,
        user_data("POST", Some(&token), Some(json!(["not", "an", "object"]))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!(-32602));
}

#[tokio::test]
async fn test_rpc_and_rest_share_the_store() {
    let router = test_router();
    let token = create_token(&router).await;

    // write through the JSON-RPC method, read through REST
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({
                "id": 5, "jsonrpc": "2.0", "method": "user/put",
                "params": {"key": "foo", "value": "bar"}
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());

    let (_, body) = send(&router, user_data("GET", Some(&token), None)).await;
    assert_eq!(body, json!({"foo": "bar"}));
}
